use crate::models::{CategoryId, LogRecord};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};

/// Secondary indices over a set of cached logs.
#[derive(Debug, Default)]
pub struct LogIndex {
    logs: Vec<LogRecord>,
    by_start: BTreeMap<(DateTime<Utc>, String), usize>,
    by_day: BTreeMap<NaiveDate, Vec<usize>>,
    by_category: HashMap<CategoryId, Vec<usize>>,
    by_task: HashMap<String, Vec<usize>>,
}

impl LogIndex {
    pub fn build(mut logs: Vec<LogRecord>) -> Self {
        logs.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));

        let mut idx = LogIndex::default();
        for (i, l) in logs.iter().enumerate() {
            idx.by_start.insert((l.start, l.id.clone()), i);
            idx.by_day.entry(l.day_key).or_default().push(i);
            idx.by_category.entry(l.category_id).or_default().push(i);
            if let Some(t) = &l.task_id {
                idx.by_task.entry(t.clone()).or_default().push(i);
            }
        }
        idx.logs = logs;
        idx
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    fn pick(&self, ids: Option<&Vec<usize>>) -> Vec<LogRecord> {
        ids.map(|v| v.iter().map(|&i| self.logs[i].clone()).collect())
            .unwrap_or_default()
    }

    pub fn by_day(&self, day: NaiveDate) -> Vec<LogRecord> {
        self.pick(self.by_day.get(&day))
    }

    pub fn by_category(&self, category: CategoryId) -> Vec<LogRecord> {
        self.pick(self.by_category.get(&category))
    }

    pub fn by_task(&self, task_id: &str) -> Vec<LogRecord> {
        self.pick(self.by_task.get(task_id))
    }

    /// Logs whose start lies in `[from, to)`.
    pub fn between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<LogRecord> {
        if from >= to {
            return Vec::new();
        }
        self.by_start
            .range((from, String::new())..(to, String::new()))
            .map(|(_, &i)| self.logs[i].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn rec(id: &str, hour: u32) -> LogRecord {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, hour, 0, 0).unwrap();
        LogRecord {
            id: id.into(),
            category_id: CategoryId::Other,
            task_id: None,
            start,
            end: None,
            note: String::new(),
            day_key: start.date_naive(),
            duration_sec: None,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn between_is_half_open() {
        let idx = LogIndex::build(vec![rec("c", 12), rec("a", 8), rec("b", 10)]);
        assert_eq!(idx.len(), 3);
        let from = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();
        let ids: Vec<String> = idx.between(from, to).into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(idx.between(to, from).is_empty());
    }
}
