//! Property tests for the disposition policy.

use hush::StatusCode;
use hush::policy::{Disposition, DispositionRequest, PolicyConfig, decide};
use proptest::prelude::*;

const ROOT: &str = "https://example.com/";

fn arb_request() -> impl Strategy<Value = DispositionRequest> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(feed, admin, background, api)| DispositionRequest {
            is_comment_feed_route: feed,
            is_admin_context: admin,
            is_async_context: background,
            is_api_context: api,
        },
    )
}

// Mostly the interesting codes, plus the whole u16 range.
fn arb_status() -> impl Strategy<Value = u16> {
    prop_oneof![
        prop::sample::select(vec![0u16, 200, 300, 301, 302, 303, 304, 307, 308, 399, 404, 410, 500, 999]),
        any::<u16>(),
    ]
}

fn arb_target() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just(ROOT.to_owned()),
        Just("https://example.com/closed".to_owned()),
        Just("/closed".to_owned()),
        Just("https://elsewhere.test/".to_owned()),
        Just("//elsewhere.test/".to_owned()),
        "[a-z:/.]{0,24}",
    ]
}

fn config(code: u16, target: &str) -> PolicyConfig {
    PolicyConfig::new(ROOT).unwrap().status_code(code).redirect_url(target)
}

proptest! {
    /// Requests that are not comment feeds always pass, whatever else is set.
    #[test]
    fn non_feed_always_passes(req in arb_request(), code in arb_status(), target in arb_target()) {
        let req = DispositionRequest { is_comment_feed_route: false, ..req };
        prop_assert_eq!(decide(&req, &config(code, &target)), Disposition::PassThrough);
    }

    /// A comment feed in any exempt context passes.
    #[test]
    fn exempt_feed_passes(req in arb_request(), code in arb_status(), target in arb_target()) {
        let req = DispositionRequest { is_comment_feed_route: true, ..req };
        prop_assume!(req.is_exempt());
        prop_assert_eq!(decide(&req, &config(code, &target)), Disposition::PassThrough);
    }

    /// Intercepted feeds only ever get a valid not-found status or a valid
    /// redirect with a non-empty target.
    #[test]
    fn intercepted_output_is_always_valid(code in arb_status(), target in arb_target()) {
        match decide(&DispositionRequest::comment_feed(), &config(code, &target)) {
            Disposition::NotFound { status } => {
                prop_assert!(code == 404 || code == 410);
                prop_assert_eq!(status.as_u16(), code);
            }
            Disposition::Redirect { target: resolved, status } => {
                prop_assert!(code != 404 && code != 410);
                prop_assert!(!resolved.is_empty());
                prop_assert!([301, 302, 307, 308].contains(&status.as_u16()));
                if ![301, 302, 307, 308].contains(&code) {
                    prop_assert_eq!(status, StatusCode::MOVED_PERMANENTLY);
                }
            }
            Disposition::PassThrough => prop_assert!(false, "feed with no exemption passed through"),
        }
    }

    /// Redirects go to the site root, the configured same-site target, or
    /// nowhere else.
    #[test]
    fn redirect_never_leaves_the_site(code in 300u16..400, target in arb_target()) {
        if let Disposition::Redirect { target: resolved, .. } =
            decide(&DispositionRequest::comment_feed(), &config(code, &target))
        {
            prop_assert!(resolved == ROOT || resolved == target);
            let same_host = resolved.parse::<http::Uri>().ok()
                .and_then(|uri| uri.host().map(|h| h.eq_ignore_ascii_case("example.com")))
                .unwrap_or(false);
            prop_assert!(same_host || (resolved.starts_with('/') && !resolved.starts_with("//")));
        }
    }

    /// Same inputs, same output.
    #[test]
    fn decide_is_idempotent(req in arb_request(), code in arb_status(), target in arb_target()) {
        let cfg = config(code, &target);
        prop_assert_eq!(decide(&req, &cfg), decide(&req, &cfg));
    }
}

#[test]
fn listed_examples() {
    let feed = DispositionRequest::comment_feed();

    assert_eq!(decide(&feed, &config(404, "")), Disposition::NotFound { status: StatusCode::NOT_FOUND });
    assert_eq!(decide(&feed, &config(410, "")), Disposition::NotFound { status: StatusCode::GONE });
    assert_eq!(
        decide(&feed, &config(302, ROOT)),
        Disposition::Redirect { target: ROOT.to_owned(), status: StatusCode::FOUND },
    );
    assert_eq!(
        decide(&feed, &config(999, ROOT)),
        Disposition::Redirect { target: ROOT.to_owned(), status: StatusCode::MOVED_PERMANENTLY },
    );
    assert_eq!(
        decide(&feed, &config(301, "")),
        Disposition::Redirect { target: ROOT.to_owned(), status: StatusCode::MOVED_PERMANENTLY },
    );
}
