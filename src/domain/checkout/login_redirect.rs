use url::Url;

/// Login page URL that brings the viewer back to `return_path` afterwards.
///
/// `open_checkout` asks the page to resume a paid membership checkout once
/// the viewer is signed in.
pub fn login_redirect(app_url: &Url, return_path: &str, open_checkout: bool) -> Url {
    let mut url = app_url.join("/login").unwrap_or_else(|_| app_url.clone());
    {
        let mut query = url.query_pairs_mut();
        query.clear().append_pair("redirect", return_path);
        if open_checkout {
            query.append_pair("openCheckout", "true");
        }
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> Url {
        Url::parse("https://fans.example").unwrap()
    }

    #[test]
    fn redirect_encodes_return_path() {
        let url = login_redirect(&app(), "/u/creator/profile1", false);
        assert_eq!(url.as_str(), "https://fans.example/login?redirect=%2Fu%2Fcreator%2Fprofile1");
    }

    #[test]
    fn paid_membership_adds_open_checkout() {
        let url = login_redirect(&app(), "/u/creator/profile1", true);
        assert!(url.as_str().ends_with("&openCheckout=true"));
    }
}
