//! Serialization of experiments and events into log lines.
//!
//! Lines are `|`-separated with sub-fields separated by `:`, `,`, `@` and `/`. Downstream tooling
//! extracts fields positionally, so field order and arity are part of the protocol:
//!
//! ```text
//! YATZ_DUMP|<name>:<type>:<variant>@<weight>/<total>,...|...
//! YATZ_EVENT|<user or _>|<event>|<identifier or _>|<count %.5f>|<experiment>:<variant>,...
//! ```
use std::borrow::Cow;

use crate::{
    experiment::Event,
    registry::{CompiledExperiment, Registry},
    sharder::Sharder,
};

pub const DUMP_PREFIX: &str = "YATZ_DUMP";
pub const EVENT_PREFIX: &str = "YATZ_EVENT";

/// Stands in for absent user ids and identifiers so that no field is ever empty.
pub const PLACEHOLDER: &str = "_";

impl CompiledExperiment {
    /// Render the definition line: `name:type:variant1@w1/total,variant2@w2/total,...`.
    pub fn dump(&self) -> String {
        let experiment = self.experiment();
        let total = experiment.total_weight();
        let variants = experiment
            .variants
            .iter()
            .map(|v| format!("{}@{}/{}", v.name, v.weight, total))
            .collect::<Vec<_>>()
            .join(",");
        format!("{}:{}:{}", experiment.name, experiment.experiment_type, variants)
    }

    /// Render `name:variant` for the variant `user` falls into.
    pub fn dump_short(&self, user: &str, sharder: &impl Sharder) -> String {
        format!("{}:{}", self.name(), self.roll(user, sharder))
    }
}

impl Registry {
    /// Render the `YATZ_DUMP` line listing the definition of every experiment.
    pub fn dump(&self) -> String {
        std::iter::once(DUMP_PREFIX.to_owned())
            .chain(self.experiments().map(CompiledExperiment::dump))
            .collect::<Vec<_>>()
            .join("|")
    }

    /// Render the `YATZ_EVENT` line for `event` fired by `user`, including `user`'s variant in
    /// every experiment.
    pub fn dump_event(&self, user: &str, event: &Event, sharder: &impl Sharder) -> String {
        let experiments = self
            .experiments()
            .map(|experiment| experiment.dump_short(user, sharder))
            .collect::<Vec<_>>()
            .join(",");

        [
            Cow::Borrowed(EVENT_PREFIX),
            or_placeholder(user),
            clean_string(&event.name),
            or_placeholder(&event.identifier),
            Cow::Owned(format!("{:.5}", event.count)),
            Cow::Owned(experiments),
        ]
        .join("|")
    }
}

fn or_placeholder(s: &str) -> Cow<'_, str> {
    if s.is_empty() {
        Cow::Borrowed(PLACEHOLDER)
    } else {
        clean_string(s)
    }
}

/// Replace field delimiters (`:`, `|` and `,`) with `_`.
pub fn clean_string(input: &str) -> Cow<'_, str> {
    if input.contains([':', '|', ','].as_slice()) {
        Cow::Owned(input.replace([':', '|', ','].as_slice(), "_"))
    } else {
        Cow::Borrowed(input)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        experiment::{DefinitionSet, Event, Experiment, ExperimentType, Variant},
        registry::Registry,
        sharder::Djb2Sharder,
    };

    use super::clean_string;

    fn registry() -> Registry {
        Registry::build(DefinitionSet::from_file("tests/data/experiments.json").unwrap()).unwrap()
    }

    #[test]
    fn dump_definition_line() {
        let registry = registry();
        assert_eq!(
            registry.get("button_color").unwrap().dump(),
            "button_color:abtest:Control@1/4,green@3/4"
        );
        assert_eq!(
            registry.get("sms_reminder").unwrap().dump(),
            "sms_reminder:phoneAbtest:Control@1/2,reminder@1/2"
        );
    }

    #[test]
    fn dump_line_lists_every_experiment() {
        assert_eq!(
            registry().dump(),
            "YATZ_DUMP\
             |experiment_name:abtest:Control@1/2,something_else@1/2\
             |button_color:abtest:Control@1/4,green@3/4\
             |sms_reminder:phoneAbtest:Control@1/2,reminder@1/2"
        );
    }

    #[test]
    fn dump_line_without_experiments() {
        let registry = Registry::build(DefinitionSet::default()).unwrap();
        assert_eq!(registry.dump(), "YATZ_DUMP");
    }

    #[test]
    fn total_is_per_experiment_and_includes_zero_weights() {
        let registry = Registry::build(DefinitionSet::from(vec![
            Experiment::new(
                "a",
                ExperimentType::Standard,
                [Variant::new("x", 0), Variant::new("y", 5)],
            ),
            Experiment::new("b", ExperimentType::Standard, [Variant::new("z", 1)]),
        ]))
        .unwrap();
        assert_eq!(registry.dump(), "YATZ_DUMP|a:abtest:x@0/5,y@5/5|b:abtest:z@1/1");
    }

    #[test]
    fn event_line() {
        let line = registry().dump_event(
            "bob",
            &Event::with_identifier("purchase", "order-17"),
            &Djb2Sharder,
        );
        assert_eq!(
            line,
            "YATZ_EVENT|bob|purchase|order-17|1.00000\
             |experiment_name:Control,button_color:green,sms_reminder:reminder"
        );

        let line = registry().dump_event("u1", &Event::new("visit", 2.0), &Djb2Sharder);
        assert_eq!(
            line,
            "YATZ_EVENT|u1|visit|_|2.00000\
             |experiment_name:something_else,button_color:green,sms_reminder:reminder"
        );
    }

    #[test]
    fn event_line_whitelisted_user() {
        let line = registry().dump_event("userid1", &Event::new("visit", 1.0), &Djb2Sharder);
        assert!(line.contains("|experiment_name:something_else,"));
    }

    #[test]
    fn placeholders_for_missing_fields() {
        let line = registry().dump_event("", &Event::new("x", 3.0), &Djb2Sharder);
        let fields: Vec<&str> = line.split('|').collect();
        assert_eq!(fields.len(), 6);
        assert_eq!(fields[1], "_");
        assert_eq!(fields[3], "_");
        assert_eq!(fields[4], "3.00000");
    }

    #[test]
    fn sanitizes_free_text_fields() {
        let line = registry().dump_event(
            "us|er",
            &Event::with_identifier("a|b:c,d", "id:1|2"),
            &Djb2Sharder,
        );
        let fields: Vec<&str> = line.split('|').collect();
        assert_eq!(fields.len(), 6);
        assert_eq!(fields[1], "us_er");
        assert_eq!(fields[2], "a_b_c_d");
        assert_eq!(fields[3], "id_1_2");
    }

    #[test]
    fn count_has_five_decimals() {
        let registry = Registry::build(DefinitionSet::default()).unwrap();
        for (count, expected) in [
            (0.0, "0.00000"),
            (1.5, "1.50000"),
            (-2.25, "-2.25000"),
            (1.0 / 3.0, "0.33333"),
            (123456.789, "123456.78900"),
        ] {
            let line = registry.dump_event("u", &Event::new("e", count), &Djb2Sharder);
            assert_eq!(line, format!("YATZ_EVENT|u|e|_|{expected}|"));
        }
    }

    #[test]
    fn clean_string_borrows_when_clean() {
        assert!(matches!(
            clean_string("nothing_to_do"),
            std::borrow::Cow::Borrowed(_)
        ));
        assert_eq!(clean_string("a:b|c,d"), "a_b_c_d");
        assert_eq!(clean_string("@/ are kept"), "@/ are kept");
    }
}
