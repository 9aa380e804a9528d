use proptest::prelude::*;
use sprig_utils::date::{format_tz_offset, parse_tz_offset};
use sprig_utils::{BStr, GitDate, Signature};

proptest! {
    #[test]
    fn tz_offset_survives_formatting(minutes in -(23 * 60 + 59)..=(23 * 60 + 59)) {
        let text = format_tz_offset(minutes);
        prop_assert_eq!(text.len(), 5);
        prop_assert_eq!(parse_tz_offset(&text).unwrap(), minutes);
    }

    #[test]
    fn valid_signatures_parse_back(
        name in "[A-Za-z][A-Za-z .'-]{0,20}[A-Za-z]",
        user in "[a-z0-9._]{1,12}",
        host in "[a-z]{1,10}\\.[a-z]{2,4}",
        timestamp in 0i64..4_000_000_000,
        offset in -(14 * 60)..=(14 * 60),
    ) {
        let email = format!("{user}@{host}");
        let sig = Signature::new(name.as_str(), email.as_str(), GitDate::new(timestamp, offset)).unwrap();
        let parsed = Signature::parse(BStr::new(&sig.to_bytes())).unwrap();
        prop_assert_eq!(parsed, sig);
    }

    #[test]
    fn emails_with_whitespace_are_rejected(
        left in "[a-z]{1,8}",
        right in "[a-z]{1,8}",
    ) {
        let email = format!("{left} {right}");
        prop_assert!(Signature::new("Someone", email.as_str(), GitDate::new(0, 0)).is_err());
    }
}
