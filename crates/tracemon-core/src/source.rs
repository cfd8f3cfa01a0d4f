use std::collections::VecDeque;

use crate::error::PollError;

/// Common interface for counter sources.
///
/// `poll` is synchronous and may block: rate counters sleep between two
/// collections to measure a delta. It is only ever called from the poller
/// thread. Dropping the source releases whatever handle it holds.
pub trait MetricSource: Send {
    /// Identifier the source was opened with, for status display.
    fn identifier(&self) -> &str;

    fn poll(&mut self) -> Result<i64, PollError>;
}

impl<S: MetricSource + ?Sized> MetricSource for Box<S> {
    fn identifier(&self) -> &str {
        (**self).identifier()
    }

    fn poll(&mut self) -> Result<i64, PollError> {
        (**self).poll()
    }
}

/// Replays a fixed sequence. `None` entries report a transient failure; once
/// the script runs out every poll fails with [`PollError::Exhausted`].
pub struct ScriptedSource {
    name: String,
    script: VecDeque<Option<i64>>,
}

impl ScriptedSource {
    pub fn new(name: impl Into<String>, script: impl IntoIterator<Item = Option<i64>>) -> Self {
        Self {
            name: name.into(),
            script: script.into_iter().collect(),
        }
    }

    /// `count` polls that all return `value`.
    pub fn constant(value: i64, count: usize) -> Self {
        Self::new(format!("constant/{value}"), std::iter::repeat_n(Some(value), count))
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl MetricSource for ScriptedSource {
    fn identifier(&self) -> &str {
        &self.name
    }

    fn poll(&mut self) -> Result<i64, PollError> {
        match self.script.pop_front() {
            Some(Some(value)) => Ok(value),
            Some(None) => Err(PollError::Unavailable(format!("{}: scripted gap", self.name))),
            None => Err(PollError::Exhausted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_then_exhausts() {
        let mut src = ScriptedSource::new("t", [Some(1), None, Some(3)]);
        assert_eq!(src.poll().unwrap(), 1);
        assert!(matches!(src.poll(), Err(PollError::Unavailable(_))));
        assert_eq!(src.poll().unwrap(), 3);
        assert!(matches!(src.poll(), Err(PollError::Exhausted)));
        assert_eq!(src.remaining(), 0);
    }

    #[test]
    fn constant_source_names_itself() {
        let mut src = ScriptedSource::constant(50, 2);
        assert_eq!(src.identifier(), "constant/50");
        assert_eq!(src.poll().unwrap(), 50);
        assert_eq!(src.poll().unwrap(), 50);
        assert!(src.poll().is_err());
    }

    #[test]
    fn boxed_sources_forward() {
        let mut boxed: Box<dyn MetricSource> = Box::new(ScriptedSource::constant(7, 1));
        assert_eq!(boxed.identifier(), "constant/7");
        assert_eq!(boxed.poll().unwrap(), 7);
    }
}
