use crate::domain::DatetimeInterval;
use super::validator::TaskValidator;

/// The flattened wire-boundary view of a `TaskValidator` tree: two ordered
/// lists of leaf intervals. `Conjunction`/`Disjunction` structure above the
/// leaves does not survive the flattening — both composite kinds simply
/// contribute their descendants' leaves to the same two lists. This is a
/// known limitation of the external API (spec.md §4.11), not a bug: a
/// response encoder downstream ANDs the two lists and ORs entries within
/// each, which is only exactly equivalent to the original tree when that
/// tree is already in that shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitValidators {
    pub must_start_between: Vec<DatetimeInterval>,
    pub must_end_between: Vec<DatetimeInterval>,
}

pub fn split(validator: &TaskValidator) -> SplitValidators {
    let mut out = SplitValidators::default();
    collect(validator, &mut out);
    out
}

fn collect(validator: &TaskValidator, out: &mut SplitValidators) {
    match validator {
        TaskValidator::MustStartBetween(interval) => out.must_start_between.push(*interval),
        TaskValidator::MustEndBetween(interval) => out.must_end_between.push(*interval),
        TaskValidator::Conjunction(children) | TaskValidator::Disjunction(children) => {
            for child in children {
                collect(child, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    fn at(hour: u32) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2021-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
            + Duration::hours(hour as i64)
    }

    #[test]
    fn flattens_nested_composites_into_two_lists() {
        let v = TaskValidator::Conjunction(vec![
            TaskValidator::Disjunction(vec![
                TaskValidator::MustStartBetween(DatetimeInterval::at(at(1))),
                TaskValidator::MustStartBetween(DatetimeInterval::at(at(2))),
            ]),
            TaskValidator::MustEndBetween(DatetimeInterval::at(at(5))),
        ]);
        let split = split(&v);
        assert_eq!(
            split.must_start_between,
            vec![DatetimeInterval::at(at(1)), DatetimeInterval::at(at(2))]
        );
        assert_eq!(split.must_end_between, vec![DatetimeInterval::at(at(5))]);
    }

    #[test]
    fn single_leaf() {
        let v = TaskValidator::MustStartBetween(DatetimeInterval::at(at(1)));
        let split = split(&v);
        assert_eq!(split.must_start_between, vec![DatetimeInterval::at(at(1))]);
        assert!(split.must_end_between.is_empty());
    }
}
