//! Print a week of habit strength with local day headers

use habit_strength::{CalendarConfig, CheckmarkOutcome, ScoreHistory, SystemClock, TruncateUnit};

fn main() {
    let config = CalendarConfig::default();
    let normalizer = match config.build(SystemClock) {
        Ok(normalizer) => normalizer,
        Err(e) => {
            eprintln!("Error: {e}");
            return;
        }
    };

    let outcomes = [
        CheckmarkOutcome::CheckedExplicitly,
        CheckmarkOutcome::Unchecked,
        CheckmarkOutcome::CheckedExplicitly,
        CheckmarkOutcome::CheckedExplicitly,
        CheckmarkOutcome::CheckedImplicitly,
        CheckmarkOutcome::Unchecked,
        CheckmarkOutcome::CheckedExplicitly,
    ];

    let result = normalizer
        .get_start_of_today()
        .and_then(|today| normalizer.truncate(TruncateUnit::Week, today))
        .and_then(|week_start| ScoreHistory::compute(3.0 / 7.0, week_start, &outcomes));

    match result {
        Ok(history) => {
            for score in history.iter().rev() {
                let header = normalizer
                    .format_header_date(score.timestamp())
                    .unwrap_or_default()
                    .replace('\n', " ");
                println!("{header:>8}  {:5.1}%", score.fraction() * 100.0);
            }
        }
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
