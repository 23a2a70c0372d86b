//! Demo events for `--seed`.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

use happenings_core::event::{EventDraft, VenueDraft};
use happenings_core::storage::RepositoryError;

use crate::state::AppState;

fn at(day: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    day.and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN))
}

fn tags(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

/// Loads a few venues and upcoming events spread over the next weeks.
///
/// One event is stored twice, the second copy flagged as a duplicate, so the
/// duplicate redirect can be tried out by hand.
pub async fn seed_demo_data(state: &AppState, today: NaiveDate) -> Result<(), RepositoryError> {
    let day = |offset: u64| today + Days::new(offset);

    let holocene = state
        .venue_repo
        .create_venue(&VenueDraft {
            title: "Holocene".to_string(),
            address: Some("1001 SE Morrison St, Portland, OR".to_string()),
            latitude: Some(45.5171),
            longitude: Some(-122.6557),
        })
        .await?;
    let library = state
        .venue_repo
        .create_venue(&VenueDraft {
            title: "Central Library".to_string(),
            address: Some("801 SW 10th Ave, Portland, OR".to_string()),
            latitude: Some(45.5191),
            longitude: Some(-122.6828),
        })
        .await?;

    let drafts = [
        EventDraft {
            title: "Jazz Night".to_string(),
            description: Some("Local trios, every other Thursday.".to_string()),
            start_time: Some(at(day(1), 19, 0)),
            end_time: Some(at(day(1), 22, 30)),
            venue_id: Some(holocene.id),
            tags: tags(&["music", "jazz"]),
            ..Default::default()
        },
        EventDraft {
            title: "Ruby Brigade".to_string(),
            description: Some("Monthly meeting. Talks, then pizza.".to_string()),
            url: Some("https://pdxruby.org".to_string()),
            start_time: Some(at(day(3), 18, 30)),
            venue_id: Some(library.id),
            tags: tags(&["tech", "ruby"]),
            ..Default::default()
        },
        EventDraft {
            title: "Zine Swap".to_string(),
            start_time: Some(at(day(9), 13, 0)),
            end_time: Some(at(day(9), 16, 0)),
            venue_id: Some(library.id),
            tags: tags(&["books", "all ages"]),
            ..Default::default()
        },
    ];

    let mut created = Vec::new();
    for draft in &drafts {
        created.push(state.event_repo.create_event(draft).await?);
    }

    if let Some(original) = created.first() {
        let duplicate = EventDraft {
            duplicate_of_id: Some(original.id),
            ..original.to_draft()
        };
        state.event_repo.create_event(&duplicate).await?;
    }

    tracing::info!(
        events = created.len() + 1,
        venues = 2,
        "Seeded demo data"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use happenings_core::event::EventQuery;
    use happenings_core::params::Params;

    #[tokio::test]
    async fn test_seeded_listing_hides_the_duplicate() {
        let state = AppState::default();
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();

        seed_demo_data(&state, today).await.unwrap();

        let all = state.event_repo.list_events().await.unwrap();
        assert_eq!(all.len(), 4);

        let venues = state.venue_index().await.unwrap();
        let query = EventQuery::from_params(&Params::new(), today);
        let listed = query.build(all, &venues, at(today, 0, 0));
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].title, "Jazz Night");
    }
}
