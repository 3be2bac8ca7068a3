use std::collections::HashMap;

use chrono::{Duration, NaiveDate, Timelike};
use oneiro_types::api::{DayCount, DreamStats};
use oneiro_types::models::Dream;

/// Tags that mark a dream as a nightmare regardless of mood.
const NEGATIVE_TAGS: [&str; 6] = ["Pesadelo", "Scared", "Ansiedade", "Bad", "Sad", "Nightmare"];
const TOP_TAGS: usize = 4;

/// Aggregate one author's dreams. Returns `None` for an empty journal.
///
/// Hours and days are taken in UTC. The weekly series covers the seven days
/// ending on `today`, oldest first.
pub fn compute(dreams: &[Dream], today: NaiveDate) -> Option<DreamStats> {
    if dreams.is_empty() {
        return None;
    }
    let total = dreams.len();

    // Insertion-ordered counts so that ties keep first-seen order
    let mut tag_counts: Vec<(String, usize)> = Vec::new();
    let mut tag_index: HashMap<&str, usize> = HashMap::new();
    let mut nightmare_count = 0;
    let mut morning = 0;
    let mut lucid = 0;

    for dream in dreams {
        for tag in &dream.tags {
            match tag_index.get(tag.as_str()) {
                Some(&i) => tag_counts[i].1 += 1,
                None => {
                    tag_index.insert(tag.as_str(), tag_counts.len());
                    tag_counts.push((tag.clone(), 1));
                }
            }
        }

        let scared = dream.mood.as_deref() == Some("Scared");
        if scared || dream.tags.iter().any(|t| NEGATIVE_TAGS.contains(&t.as_str())) {
            nightmare_count += 1;
        }

        if (5..11).contains(&dream.created_at.hour()) {
            morning += 1;
        }
        if dream.is_lucid {
            lucid += 1;
        }
    }

    tag_counts.sort_by(|a, b| b.1.cmp(&a.1));
    tag_counts.truncate(TOP_TAGS);
    let max_tag_count = tag_counts.first().map_or(1, |(_, n)| *n);

    let weekly: Vec<DayCount> = (0..7)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            let count = dreams.iter().filter(|d| d.dreamt_at.date_naive() == date).count();
            DayCount { date, count }
        })
        .collect();
    let max_daily_dreams = weekly.iter().map(|d| d.count).max().unwrap_or(0).max(1);

    Some(DreamStats {
        total,
        top_tags: tag_counts,
        max_tag_count,
        positive_count: total - nightmare_count,
        nightmare_count,
        lucid_pct: percent(lucid, total),
        morning_pct: percent(morning, total),
        weekly,
        max_daily_dreams,
    })
}

/// Rounded percentage, halves rounding up.
fn percent(part: usize, total: usize) -> u8 {
    ((part * 200 + total) / (2 * total)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use oneiro_types::models::{Language, Visibility};
    use uuid::Uuid;

    fn dream(tags: &[&str], mood: Option<&str>, lucid: bool, day: u32, hour: u32) -> Dream {
        let at = Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap();
        Dream {
            id: Uuid::new_v4(),
            author_id: Uuid::nil(),
            author_name: "alice".into(),
            author_avatar: None,
            title: "t".into(),
            description: "d".into(),
            created_at: at,
            dreamt_at: at,
            visibility: Visibility::Private,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            image_url: None,
            mood: mood.map(str::to_string),
            is_lucid: lucid,
            language: Language::En,
            likes: 0,
            has_liked: false,
            comment_count: 0,
            analysis: None,
        }
    }

    #[test]
    fn empty_journal_has_no_stats() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        assert!(compute(&[], today).is_none());
    }

    #[test]
    fn aggregates_tags_moods_and_routine() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let dreams = vec![
            dream(&["Water", "Flight"], Some("Calm"), true, 10, 6),
            dream(&["Water", "Nightmare"], None, false, 10, 22),
            dream(&["Teeth"], Some("Scared"), false, 8, 7),
            dream(&["Flight", "Water"], None, false, 1, 3),
        ];

        let stats = compute(&dreams, today).unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.top_tags[0], ("Water".to_string(), 3));
        assert_eq!(stats.top_tags[1], ("Flight".to_string(), 2));
        assert_eq!(stats.top_tags.len(), 4);
        assert_eq!(stats.max_tag_count, 3);
        assert_eq!(stats.nightmare_count, 2);
        assert_eq!(stats.positive_count, 2);
        assert_eq!(stats.lucid_pct, 25);
        assert_eq!(stats.morning_pct, 50);

        assert_eq!(stats.weekly.len(), 7);
        assert_eq!(stats.weekly[0].date, NaiveDate::from_ymd_opt(2024, 5, 4).unwrap());
        assert_eq!(stats.weekly[6].count, 2);
        assert_eq!(stats.weekly[4].count, 1);
        assert_eq!(stats.max_daily_dreams, 2);
    }

    #[test]
    fn percentages_round_half_up() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13);
    }
}
