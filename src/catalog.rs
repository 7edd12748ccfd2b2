use serde::{Deserialize, Serialize};

/// The three families of mini-tests
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
pub enum TestCategory {
    #[serde(rename = "Reaction & Attention")]
    #[strum(serialize = "Reaction & Attention")]
    ReactionAttention,
    #[serde(rename = "Working Memory")]
    #[strum(serialize = "Working Memory")]
    WorkingMemory,
    #[serde(rename = "Executive Function")]
    #[strum(serialize = "Executive Function")]
    ExecutiveFunction,
}

impl TestCategory {
    pub const ALL: [TestCategory; 3] = [
        TestCategory::ReactionAttention,
        TestCategory::WorkingMemory,
        TestCategory::ExecutiveFunction,
    ];

    pub fn sub_tests(self) -> impl Iterator<Item = SubTest> {
        SubTest::ALL.into_iter().filter(move |t| t.category() == self)
    }
}

/// Individual mini-test identity.
///
/// Serialized under the display names used by the stored history payload,
/// and addressed on the command line by its kebab-case slug.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
pub enum SubTest {
    #[serde(rename = "Simple Reaction")]
    #[strum(serialize = "Simple Reaction")]
    SimpleReaction,
    #[serde(rename = "Go/No-Go")]
    #[strum(serialize = "Go/No-Go")]
    GoNoGo,
    #[serde(rename = "Stroop-like Reaction")]
    #[strum(serialize = "Stroop-like Reaction")]
    StroopReaction,
    #[serde(rename = "Target vs Distractors")]
    #[strum(serialize = "Target vs Distractors")]
    TargetDistractors,
    #[serde(rename = "N-Back")]
    #[strum(serialize = "N-Back")]
    NBack,
    #[serde(rename = "Sequence Memory")]
    #[strum(serialize = "Sequence Memory")]
    SequenceMemory,
    #[serde(rename = "Spatial Memory")]
    #[strum(serialize = "Spatial Memory")]
    SpatialMemory,
    #[serde(rename = "Decision-Making")]
    #[strum(serialize = "Decision-Making")]
    DecisionMaking,
    #[serde(rename = "Task Switching")]
    #[strum(serialize = "Task Switching")]
    TaskSwitching,
}

impl SubTest {
    pub const ALL: [SubTest; 9] = [
        SubTest::SimpleReaction,
        SubTest::GoNoGo,
        SubTest::StroopReaction,
        SubTest::TargetDistractors,
        SubTest::NBack,
        SubTest::SequenceMemory,
        SubTest::SpatialMemory,
        SubTest::DecisionMaking,
        SubTest::TaskSwitching,
    ];

    pub fn category(self) -> TestCategory {
        match self {
            SubTest::SimpleReaction
            | SubTest::GoNoGo
            | SubTest::StroopReaction
            | SubTest::TargetDistractors => TestCategory::ReactionAttention,
            SubTest::NBack | SubTest::SequenceMemory | SubTest::SpatialMemory => {
                TestCategory::WorkingMemory
            }
            SubTest::DecisionMaking | SubTest::TaskSwitching => TestCategory::ExecutiveFunction,
        }
    }

    /// Command-line identifier, e.g. `go-no-go`
    pub fn slug(self) -> &'static str {
        match self {
            SubTest::SimpleReaction => "simple-reaction",
            SubTest::GoNoGo => "go-no-go",
            SubTest::StroopReaction => "stroop-reaction",
            SubTest::TargetDistractors => "target-distractors",
            SubTest::NBack => "n-back",
            SubTest::SequenceMemory => "sequence-memory",
            SubTest::SpatialMemory => "spatial-memory",
            SubTest::DecisionMaking => "decision-making",
            SubTest::TaskSwitching => "task-switching",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SubTest::SimpleReaction => "Click the target shape as quickly as possible.",
            SubTest::GoNoGo => "Respond only to Go stimuli, inhibit response to No-Go.",
            SubTest::StroopReaction => "Select the color of text, not the word itself.",
            SubTest::TargetDistractors => "Click the target shape among multiple distractors.",
            SubTest::NBack => "Click when current item matches N items back.",
            SubTest::SequenceMemory => "Reproduce a sequence of items in order.",
            SubTest::SpatialMemory => "Click positions on a grid in the order they appeared.",
            SubTest::DecisionMaking => "Select the correct option under time pressure.",
            SubTest::TaskSwitching => "Switch between different rules during the test.",
        }
    }

    /// Cycles `None -> first -> ... -> last -> None`, used by the trends filter
    pub fn cycle(current: Option<SubTest>) -> Option<SubTest> {
        match current {
            None => Some(SubTest::ALL[0]),
            Some(t) => {
                let idx = SubTest::ALL.iter().position(|x| *x == t).unwrap_or(0);
                SubTest::ALL.get(idx + 1).copied()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_owns_its_sub_tests() {
        let counts: Vec<usize> = TestCategory::ALL
            .iter()
            .map(|c| c.sub_tests().count())
            .collect();
        assert_eq!(counts, vec![4, 3, 2]);
    }

    #[test]
    fn display_names_match_stored_payload() {
        assert_eq!(SubTest::GoNoGo.to_string(), "Go/No-Go");
        assert_eq!(
            serde_json::to_string(&SubTest::NBack).unwrap(),
            "\"N-Back\""
        );
        assert_eq!(
            serde_json::to_string(&TestCategory::WorkingMemory).unwrap(),
            "\"Working Memory\""
        );
        let t: SubTest = serde_json::from_str("\"Decision-Making\"").unwrap();
        assert_eq!(t, SubTest::DecisionMaking);
    }

    #[test]
    fn slugs_match_value_enum_names() {
        use clap::ValueEnum;
        for t in SubTest::ALL {
            let pv = t.to_possible_value().unwrap();
            assert_eq!(pv.get_name(), t.slug());
        }
    }

    #[test]
    fn cycle_wraps_back_to_none() {
        let mut current = None;
        for expected in SubTest::ALL {
            current = SubTest::cycle(current);
            assert_eq!(current, Some(expected));
        }
        assert_eq!(SubTest::cycle(current), None);
    }
}
