//! Property tests for the leaf renderers and the status coloring.

use console::strip_ansi_codes;
use proptest::prelude::*;

use stackwatch_core::status::{humanize, StackStatus, StatusEntry, StatusHistory, Tone};
use stackwatch_progress::{style, Renderer, SummaryBar, Table};

const STATUSES: &[&str] = &[
    "CREATE_IN_PROGRESS",
    "CREATE_COMPLETE",
    "CREATE_FAILED",
    "UPDATE_IN_PROGRESS",
    "UPDATE_COMPLETE",
    "UPDATE_ROLLBACK_COMPLETE",
    "DELETE_SKIPPED",
    "REVIEW_IN_PROGRESS",
];

fn reps(n: usize) -> Vec<String> {
    (0..n).map(|i| char::from(b'a' + u8::try_from(i).unwrap()).to_string()).collect()
}

proptest! {
    #[test]
    fn summary_bar_has_exact_width(
        data in prop::collection::vec(0i64..1000, 1..8),
        width in 1i64..200,
    ) {
        let representations = reps(data.len());
        let bar = SummaryBar::new(data.clone(), width, representations.clone(), ".").bar().unwrap();
        prop_assert_eq!(bar.chars().count(), usize::try_from(width).unwrap());

        if data.iter().sum::<i64>() == 0 {
            prop_assert!(bar.chars().all(|c| c == '.'));
        } else {
            let counted: usize = representations
                .iter()
                .map(|r| bar.matches(r.as_str()).count())
                .sum();
            prop_assert_eq!(counted, usize::try_from(width).unwrap());
        }
    }

    #[test]
    fn summary_bar_portions_stay_close_to_exact_share(
        data in prop::collection::vec(1i64..100, 1..6),
        width in 1i64..100,
    ) {
        let representations = reps(data.len());
        let bar = SummaryBar::new(data.clone(), width, representations.clone(), " ").bar().unwrap();
        let sum: i64 = data.iter().sum();
        for (d, r) in data.iter().zip(&representations) {
            #[allow(clippy::cast_precision_loss)]
            let exact = *d as f64 / sum as f64 * width as f64;
            #[allow(clippy::cast_precision_loss)]
            let got = bar.matches(r.as_str()).count() as f64;
            prop_assert!(got >= exact.floor() && got <= exact.floor() + 1.0);
        }
    }

    #[test]
    fn table_line_count(rows in prop::collection::vec(prop::collection::vec("[a-z]{0,30}", 2), 0..6)) {
        let n = rows.len();
        let table = Table::new("Title", &["One", "Two"], rows);
        let mut buf = Vec::new();
        let lines = table.render(&mut buf).unwrap();
        let written = String::from_utf8(buf).unwrap().lines().count();
        if n == 0 {
            prop_assert_eq!(lines, 0);
            prop_assert_eq!(written, 0);
        } else {
            prop_assert_eq!(lines, n + 2);
            prop_assert_eq!(written, n + 2);
        }
    }

    #[test]
    fn latest_status_is_humanized_and_red_after_any_failure(
        picks in prop::collection::vec(0..STATUSES.len(), 1..10),
    ) {
        console::set_colors_enabled(true);
        let mut history = StatusHistory::new();
        for i in &picks {
            history.push(StatusEntry::new(StackStatus::new(STATUSES[*i]), ""));
        }
        let latest = STATUSES[picks[picks.len() - 1]];
        let styled = style::latest_status(&history);
        prop_assert_eq!(strip_ansi_codes(&styled).into_owned(), format!("[{}]", humanize(latest)));

        let failed = picks.iter().any(|i| STATUSES[*i].ends_with("_FAILED") || STATUSES[*i].contains("ROLLBACK"));
        prop_assert_eq!(history.tone() == Tone::Failure, failed);
        prop_assert_eq!(styled.contains("\x1b[31m"), failed);
    }
}
