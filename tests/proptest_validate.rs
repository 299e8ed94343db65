use proptest::prelude::*;
use wastekit::label::{parse_label_line, to_label_string};
use wastekit::validation::{validate_label_str, LabelIssueKind};

mod proptest_helpers;

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn generated_valid_records_pass_validation(
        records in prop::collection::vec(proptest_helpers::arb_valid_record(5), 0..20)
    ) {
        let content = to_label_string(&records);
        prop_assert!(validate_label_str(&content, 5).is_empty());
    }

    #[test]
    fn written_records_parse_back(record in proptest_helpers::arb_valid_record(5)) {
        let parsed = parse_label_line(&record.to_string())
            .expect("parse")
            .expect("non-blank");
        prop_assert_eq!(parsed.class_id, record.class_id);
        prop_assert!((parsed.center_x - record.center_x).abs() <= 1e-6);
        prop_assert!((parsed.height - record.height).abs() <= 1e-6);
    }

    #[test]
    fn wrong_field_count_yields_single_issue(
        line in proptest_helpers::arb_wrong_field_count_line(),
        padding in 0usize..3,
    ) {
        let content = format!("{}{}\n", "\n".repeat(padding), line);
        let issues = validate_label_str(&content, 5);

        prop_assert_eq!(issues.len(), 1);
        prop_assert_eq!(issues[0].kind, LabelIssueKind::FieldCount);
        prop_assert_eq!(issues[0].line, Some(padding + 1));
    }

    #[test]
    fn class_ids_outside_range_are_flagged(
        class_id in prop_oneof![-1000i64..0, 5i64..1000],
    ) {
        let issues = validate_label_str(&format!("{class_id} 0.5 0.5 0.2 0.2"), 5);
        prop_assert_eq!(issues.len(), 1);
        prop_assert_eq!(issues[0].kind, LabelIssueKind::ClassOutOfRange);
    }

    #[test]
    fn validation_never_panics(content in "[ -~\n]{0,200}") {
        let _ = validate_label_str(&content, 5);
    }
}
