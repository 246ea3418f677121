use super::Condition;
use super::ConditionSeverity;
use super::ConditionStatus;
use super::CONDITION_READY;

/// Gives a condition set access to the conditions of a status value
pub trait ConditionsAccessor {
    fn conditions(&self) -> &[Condition];

    fn conditions_mut(&mut self) -> &mut Vec<Condition>;
}

/// A happy condition that is true exactly when all of its dependents are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionSet {
    happy: &'static str,
    dependents: &'static [&'static str],
}

impl ConditionSet {
    /// set for long-running resources, summarized by `Ready`
    pub const fn living(dependents: &'static [&'static str]) -> Self {
        Self {
            happy: CONDITION_READY,
            dependents,
        }
    }

    pub fn happy(&self) -> &'static str {
        self.happy
    }

    pub fn dependents(&self) -> &'static [&'static str] {
        self.dependents
    }

    pub fn manage<'a, A>(&'a self, accessor: &'a mut A) -> ConditionManager<'a>
    where
        A: ConditionsAccessor,
    {
        ConditionManager {
            set: self,
            conditions: accessor.conditions_mut(),
        }
    }

    pub fn get_condition<'a, A>(&self, accessor: &'a A, condition_type: &str) -> Option<&'a Condition>
    where
        A: ConditionsAccessor,
    {
        accessor
            .conditions()
            .iter()
            .find(|cond| cond.condition_type == condition_type)
    }

    pub fn is_happy<A: ConditionsAccessor>(&self, accessor: &A) -> bool {
        self.get_condition(accessor, self.happy)
            .map_or(false, Condition::is_true)
    }

    fn is_terminal(&self, condition_type: &str) -> bool {
        condition_type == self.happy || self.dependents.contains(&condition_type)
    }

    fn severity(&self, condition_type: &str) -> ConditionSeverity {
        if self.is_terminal(condition_type) {
            ConditionSeverity::Error
        } else {
            ConditionSeverity::Info
        }
    }
}

/// Mutates conditions while keeping the happy condition in step with its dependents
pub struct ConditionManager<'a> {
    set: &'a ConditionSet,
    conditions: &'a mut Vec<Condition>,
}

impl<'a> ConditionManager<'a> {
    pub fn get_condition(&self, condition_type: &str) -> Option<&Condition> {
        self.conditions
            .iter()
            .find(|cond| cond.condition_type == condition_type)
    }

    pub fn is_happy(&self) -> bool {
        self.get_condition(self.set.happy)
            .map_or(false, Condition::is_true)
    }

    /// Store a condition, keeping the list sorted by type.
    /// An unchanged condition keeps its transition time.
    pub fn set_condition(&mut self, mut condition: Condition) {
        let position = self
            .conditions
            .iter()
            .position(|cond| cond.condition_type == condition.condition_type);

        if let Some(index) = position {
            if self.conditions[index].same_state(&condition) {
                return;
            }
            self.conditions.remove(index);
        }
        condition.stamp();
        self.conditions.push(condition);
        self.conditions
            .sort_by(|a, b| a.condition_type.cmp(&b.condition_type));
    }

    /// Add missing terminal conditions as Unknown, or True when the
    /// happy condition is already True.
    pub fn initialize_conditions(&mut self) {
        let current = self.get_condition(self.set.happy).map(|happy| happy.status);
        let happy_status = match current {
            Some(status) => status,
            None => {
                self.set_condition(Condition::new(self.set.happy, ConditionStatus::Unknown));
                ConditionStatus::Unknown
            }
        };

        let status = if happy_status == ConditionStatus::True {
            ConditionStatus::True
        } else {
            ConditionStatus::Unknown
        };

        for dependent in self.set.dependents {
            if self.get_condition(dependent).is_none() {
                self.set_condition(Condition::new(*dependent, status));
            }
        }
    }

    pub fn mark_true(&mut self, condition_type: &str) {
        let mut condition = Condition::new(condition_type, ConditionStatus::True);
        condition.severity = self.set.severity(condition_type);
        self.set_condition(condition);

        // any dependent that is not true keeps the happy condition where it is
        let all_true = self.set.dependents.iter().all(|dependent| {
            self.get_condition(dependent)
                .map_or(false, Condition::is_true)
        });
        if all_true {
            self.set_condition(Condition::new(self.set.happy, ConditionStatus::True));
        }
    }

    pub fn mark_false(&mut self, condition_type: &str, reason: &str, message: &str) {
        let mut types = vec![condition_type];
        if self.set.dependents.contains(&condition_type) {
            types.push(self.set.happy);
        }
        for t in types {
            let mut condition =
                Condition::new(t, ConditionStatus::False).with_reason(reason, message);
            condition.severity = self.set.severity(t);
            self.set_condition(condition);
        }
    }

    pub fn mark_unknown(&mut self, condition_type: &str, reason: &str, message: &str) {
        let mut condition =
            Condition::new(condition_type, ConditionStatus::Unknown).with_reason(reason, message);
        condition.severity = self.set.severity(condition_type);
        self.set_condition(condition);

        // a failed dependent outranks an unknown one
        let failed = self.set.dependents.iter().any(|dependent| {
            self.get_condition(dependent)
                .map_or(false, Condition::is_false)
        });
        if failed {
            let happy_false = self
                .get_condition(self.set.happy)
                .map_or(false, Condition::is_false);
            if !happy_false {
                self.mark_false(self.set.happy, reason, message);
            }
            return;
        }

        if self.set.is_terminal(condition_type) {
            self.set_condition(
                Condition::new(self.set.happy, ConditionStatus::Unknown)
                    .with_reason(reason, message),
            );
        }
    }
}
