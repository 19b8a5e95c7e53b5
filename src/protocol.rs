//! Parsing of log lines produced by [`dump`](crate::dump).
//!
//! These are the inverse of the serializers and extract the same positional fields as downstream
//! analytics queries do.
use std::sync::OnceLock;

use regex::Regex;

use crate::{
    dump::{DUMP_PREFIX, PLACEHOLDER},
    experiment::ExperimentType,
    Error, Result,
};

/// A parsed experiment definition line (`name:type:variant@weight/total,...`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionLine {
    pub name: String,
    pub experiment_type: ExperimentType,
    /// `(variant name, weight)` in declaration order.
    pub variants: Vec<(String, u32)>,
    pub total: u64,
}

/// A parsed `YATZ_DUMP` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpLine {
    pub experiments: Vec<DefinitionLine>,
}

/// A parsed `YATZ_EVENT` line.
#[derive(Debug, Clone, PartialEq)]
pub struct EventLine {
    /// `None` if the line carries the placeholder.
    pub user: Option<String>,
    pub event: String,
    /// `None` if the line carries the placeholder.
    pub identifier: Option<String>,
    pub count: f64,
    /// `(experiment, variant)` pairs.
    pub assignments: Vec<(String, String)>,
}

fn definition_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([^:|,@/]+):([^:|,@/]+):([^:|]+)$").expect("definition regex is valid")
    })
}

fn variant_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([^:|,@/]+)@(\d+)/(\d+)$").expect("variant regex is valid")
    })
}

fn event_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^YATZ_EVENT\|([^|]+)\|([^|]*)\|([^|]+)\|([^|]+)\|([^|]*)$")
            .expect("event regex is valid")
    })
}

fn malformed(reason: impl Into<String>) -> Error {
    Error::MalformedLine(reason.into())
}

impl DefinitionLine {
    pub fn parse(line: &str) -> Result<DefinitionLine> {
        let caps = definition_regex()
            .captures(line)
            .ok_or_else(|| malformed(format!("not a definition line: {line:?}")))?;

        let experiment_type = ExperimentType::from_str_name(&caps[2])
            .ok_or_else(|| malformed(format!("unknown experiment type: {:?}", &caps[2])))?;

        let mut variants = Vec::new();
        let mut total = None;
        for variant in caps[3].split(',') {
            let v = variant_regex()
                .captures(variant)
                .ok_or_else(|| malformed(format!("malformed variant: {variant:?}")))?;
            let weight: u32 = v[2]
                .parse()
                .map_err(|_| malformed(format!("invalid weight: {:?}", &v[2])))?;
            let variant_total: u64 = v[3]
                .parse()
                .map_err(|_| malformed(format!("invalid total: {:?}", &v[3])))?;
            if *total.get_or_insert(variant_total) != variant_total {
                return Err(malformed("variants disagree on total weight"));
            }
            variants.push((v[1].to_owned(), weight));
        }

        let total = total.unwrap_or_default();
        let sum: u64 = variants.iter().map(|(_, w)| u64::from(*w)).sum();
        if sum != total {
            return Err(malformed(format!(
                "weights sum to {sum}, line declares {total}"
            )));
        }

        Ok(DefinitionLine {
            name: caps[1].to_owned(),
            experiment_type,
            variants,
            total,
        })
    }
}

impl DumpLine {
    pub fn parse(line: &str) -> Result<DumpLine> {
        let mut fields = line.split('|');
        if fields.next() != Some(DUMP_PREFIX) {
            return Err(malformed("missing YATZ_DUMP prefix"));
        }
        let experiments = fields
            .map(DefinitionLine::parse)
            .collect::<Result<Vec<_>>>()?;
        Ok(DumpLine { experiments })
    }
}

impl EventLine {
    pub fn parse(line: &str) -> Result<EventLine> {
        let caps = event_regex()
            .captures(line)
            .ok_or_else(|| malformed(format!("not an event line: {line:?}")))?;

        let count = caps[4]
            .parse()
            .map_err(|_| malformed(format!("invalid count: {:?}", &caps[4])))?;

        let assignments = if caps[5].is_empty() {
            Vec::new()
        } else {
            caps[5]
                .split(',')
                .map(|pair| {
                    pair.split_once(':')
                        .map(|(e, v)| (e.to_owned(), v.to_owned()))
                        .ok_or_else(|| malformed(format!("malformed assignment: {pair:?}")))
                })
                .collect::<Result<Vec<_>>>()?
        };

        Ok(EventLine {
            user: placeholder_to_option(&caps[1]),
            event: caps[2].to_owned(),
            identifier: placeholder_to_option(&caps[3]),
            count,
            assignments,
        })
    }

    /// Variant recorded for `experiment`, if the line has one.
    pub fn variant(&self, experiment: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|(e, _)| e == experiment)
            .map(|(_, v)| v.as_str())
    }
}

fn placeholder_to_option(field: &str) -> Option<String> {
    (field != PLACEHOLDER).then(|| field.to_owned())
}

#[cfg(test)]
mod tests {
    use crate::{
        experiment::{DefinitionSet, Event, ExperimentType},
        registry::Registry,
        sharder::Djb2Sharder,
        Error,
    };

    use super::{DefinitionLine, DumpLine, EventLine};

    fn registry() -> Registry {
        Registry::build(DefinitionSet::from_file("tests/data/experiments.json").unwrap()).unwrap()
    }

    #[test]
    fn definition_line_round_trip() {
        let registry = registry();
        for experiment in registry.experiments() {
            let parsed = DefinitionLine::parse(&experiment.dump()).unwrap();
            let source = experiment.experiment();
            assert_eq!(parsed.name, source.name);
            assert_eq!(parsed.experiment_type, source.experiment_type);
            assert_eq!(parsed.total, source.total_weight());
            assert_eq!(
                parsed.variants,
                source
                    .variants
                    .iter()
                    .map(|v| (v.name.clone(), v.weight))
                    .collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn dump_line_round_trip() {
        let parsed = DumpLine::parse(&registry().dump()).unwrap();
        let names: Vec<&str> = parsed.experiments.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["experiment_name", "button_color", "sms_reminder"]);
        assert_eq!(
            parsed.experiments[2].experiment_type,
            ExperimentType::AlternateKey
        );

        assert_eq!(
            DumpLine::parse("YATZ_DUMP").unwrap(),
            DumpLine {
                experiments: vec![]
            }
        );
    }

    #[test]
    fn rejects_inconsistent_totals() {
        assert!(matches!(
            DefinitionLine::parse("exp:abtest:a@1/3,b@1/3"),
            Err(Error::MalformedLine(_))
        ));
        assert!(matches!(
            DefinitionLine::parse("exp:abtest:a@1/2,b@1/3"),
            Err(Error::MalformedLine(_))
        ));
        assert!(matches!(
            DefinitionLine::parse("exp:unknown:a@1/1"),
            Err(Error::MalformedLine(_))
        ));
        assert!(matches!(
            DumpLine::parse("YATZ_EVENT|a"),
            Err(Error::MalformedLine(_))
        ));
    }

    #[test]
    fn event_line_round_trip() {
        let registry = registry();
        let line = registry.dump_event(
            "u1",
            &Event::with_identifier("purchase", "order-17"),
            &Djb2Sharder,
        );
        let parsed = EventLine::parse(&line).unwrap();

        assert_eq!(parsed.user.as_deref(), Some("u1"));
        assert_eq!(parsed.event, "purchase");
        assert_eq!(parsed.identifier.as_deref(), Some("order-17"));
        assert_eq!(parsed.count, 1.0);
        assert_eq!(parsed.assignments.len(), 3);
        assert_eq!(parsed.variant("button_color"), Some("green"));
        assert_eq!(parsed.variant("nonexistent"), None);
    }

    #[test]
    fn event_line_placeholders() {
        let line = registry().dump_event("", &Event::new("x", 3.0), &Djb2Sharder);
        let parsed = EventLine::parse(&line).unwrap();
        assert_eq!(parsed.user, None);
        assert_eq!(parsed.identifier, None);
        assert_eq!(parsed.count, 3.0);
    }

    #[test]
    fn event_line_without_experiments() {
        let parsed = EventLine::parse("YATZ_EVENT|u|e|_|0.50000|").unwrap();
        assert!(parsed.assignments.is_empty());
        assert_eq!(parsed.count, 0.5);
    }

    #[test]
    fn rejects_wrong_arity() {
        assert!(EventLine::parse("YATZ_EVENT|u|e|_|1.00000").is_err());
        assert!(EventLine::parse("YATZ_EVENT|u|e|_|1.00000|a:b|extra").is_err());
        assert!(EventLine::parse("YATZ_EVENT|u|e|_|many|a:b").is_err());
    }
}
