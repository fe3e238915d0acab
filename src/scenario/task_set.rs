use rand::{
    distributions::{Distribution, WeightedIndex},
    Rng,
};

use super::{ScenarioError, TaskKind};

pub const DEFAULT_WEIGHT: u32 = 1;

#[derive(Debug, Clone)]
pub enum TaskEntry {
    Task(TaskKind),
    Set(TaskSet),
}

#[derive(Debug, Clone)]
pub struct WeightedEntry {
    pub entry: TaskEntry,
    pub weight: u32,
}

/// Weighted group of tasks and nested task sets.
///
/// Picking a nested set immediately picks one of its own entries by its own
/// weights, so a composite set blends its children request by request.
#[derive(Debug, Clone)]
pub struct TaskSet {
    name: String,
    entries: Vec<WeightedEntry>,
    index: WeightedIndex<u32>,
}

impl TaskSet {
    pub fn builder(name: impl Into<String>) -> TaskSetBuilder {
        TaskSetBuilder {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[WeightedEntry] {
        &self.entries
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> TaskKind {
        match &self.entries[self.index.sample(rng)].entry {
            TaskEntry::Task(task) => *task,
            TaskEntry::Set(set) => set.pick(rng),
        }
    }

    /// Effective selection probability of every reachable task.
    pub fn probabilities(&self) -> Vec<(TaskKind, f64)> {
        let total: u32 = self.entries.iter().map(|e| e.weight).sum();
        let mut out: Vec<(TaskKind, f64)> = Vec::new();
        for entry in &self.entries {
            let share = f64::from(entry.weight) / f64::from(total);
            match &entry.entry {
                TaskEntry::Task(task) => accumulate(&mut out, *task, share),
                TaskEntry::Set(set) => {
                    for (task, p) in set.probabilities() {
                        accumulate(&mut out, task, share * p);
                    }
                }
            }
        }
        out
    }
}

fn accumulate(out: &mut Vec<(TaskKind, f64)>, task: TaskKind, p: f64) {
    match out.iter_mut().find(|(t, _)| *t == task) {
        Some((_, existing)) => *existing += p,
        None => out.push((task, p)),
    }
}

pub struct TaskSetBuilder {
    name: String,
    entries: Vec<WeightedEntry>,
}

impl TaskSetBuilder {
    pub fn task(self, task: TaskKind) -> Self {
        self.weighted_task(task, DEFAULT_WEIGHT)
    }

    pub fn weighted_task(mut self, task: TaskKind, weight: u32) -> Self {
        self.entries.push(WeightedEntry {
            entry: TaskEntry::Task(task),
            weight,
        });
        self
    }

    pub fn set(self, set: TaskSet) -> Self {
        self.weighted_set(set, DEFAULT_WEIGHT)
    }

    pub fn weighted_set(mut self, set: TaskSet, weight: u32) -> Self {
        self.entries.push(WeightedEntry {
            entry: TaskEntry::Set(set),
            weight,
        });
        self
    }

    pub fn build(self) -> Result<TaskSet, ScenarioError> {
        if self.entries.is_empty() {
            return Err(ScenarioError::EmptyTaskSet(self.name));
        }
        let index = WeightedIndex::new(self.entries.iter().map(|e| e.weight)).map_err(
            |source| ScenarioError::InvalidWeights {
                name: self.name.clone(),
                source,
            },
        )?;
        Ok(TaskSet {
            name: self.name,
            entries: self.entries,
            index,
        })
    }
}
