use super::stack::{LayerRole, SelectionStack, StackedPath};
use super::{EntityId, Value};

/// Mutable state threaded through the steps of one scenario.
///
/// Holds the current selection, the selection stack and the applicability
/// flag. Given-steps change it only through the methods below; Then-steps read
/// it.
#[derive(Debug, Clone)]
pub struct RuleEvaluationContext {
    instances: Vec<Value>,
    stack: SelectionStack,
    applicable: bool,
    error_on_passed_rule: bool,
}

impl RuleEvaluationContext {
    #[must_use]
    pub fn new(error_on_passed_rule: bool) -> Self {
        Self {
            instances: Vec::new(),
            stack: SelectionStack::new(),
            applicable: true,
            error_on_passed_rule,
        }
    }

    /// The current selection.
    #[must_use]
    pub fn instances(&self) -> &[Value] {
        &self.instances
    }

    /// Entities at the top level of the current selection.
    #[must_use]
    pub fn entities(&self) -> Vec<EntityId> {
        self.instances.iter().filter_map(Value::as_entity).collect()
    }

    #[must_use]
    pub fn stack(&self) -> &SelectionStack {
        &self.stack
    }

    #[must_use]
    pub fn is_applicable(&self) -> bool {
        self.applicable
    }

    #[must_use]
    pub fn error_on_passed_rule(&self) -> bool {
        self.error_on_passed_rule
    }

    /// Combine a precondition into the applicability flag. Once false it
    /// stays false for the rest of the scenario.
    pub fn restrict_applicability(&mut self, precondition: bool) {
        self.applicable = self.applicable && precondition;
    }

    /// Start a fresh top-level selection, discarding every layer.
    pub fn select(&mut self, entities: Vec<EntityId>) {
        self.stack.clear();
        self.instances = entities.into_iter().map(Value::Entity).collect();
    }

    /// Keep only the top-level positions where `keep` is true, in the current
    /// selection and every layer aligned with it.
    pub fn narrow(&mut self, keep: &[bool]) {
        if keep.len() != self.instances.len() {
            return;
        }
        self.stack.retain_indices(keep);
        let mut flags = keep.iter();
        self.instances
            .retain(|_| flags.next().copied().unwrap_or(false));
    }

    /// Make `projected` the current selection, remembering the previous one as
    /// a scope layer. When no projected leaf is truthy the selection becomes
    /// empty and the context inapplicable. Returns whether anything was found.
    pub fn descend(&mut self, label: &str, projected: Vec<Value>) -> bool {
        let found = projected.iter().any(has_truthy_leaf);
        let previous = std::mem::replace(&mut self.instances, projected);
        self.stack.push(label, previous, LayerRole::Scope);
        if !found {
            self.instances.clear();
            self.applicable = false;
        }
        found
    }

    /// Record `projected` as a branch layer and keep the current selection.
    pub fn branch(&mut self, label: &str, projected: Vec<Value>) {
        self.stack.push(label, projected, LayerRole::Branch);
    }

    /// Per-leaf paths of the current selection, or of the named branch layer
    /// when `branch` is given. An unknown branch label yields no paths.
    #[must_use]
    pub fn paths(&self, branch: Option<&str>) -> Vec<StackedPath> {
        match branch {
            None => self.stack.paths(&self.instances, None),
            Some(label) => match self.stack.branch(label) {
                Some(layer) => self.stack.paths(&self.instances, Some(layer)),
                None => Vec::new(),
            },
        }
    }

    /// Top-level values of the current selection (or of a branch layer) paired
    /// with the instance each one derives from.
    #[must_use]
    pub fn top_level(&self, branch: Option<&str>) -> Vec<(Option<EntityId>, Value)> {
        let values: &[Value] = match branch {
            None => &self.instances,
            Some(label) => match self.stack.branch(label) {
                Some(layer) => &layer.selection,
                None => return Vec::new(),
            },
        };
        let base = self
            .stack
            .base()
            .map(|l| l.selection.as_slice())
            .filter(|s| s.len() == values.len())
            .unwrap_or(self.instances.as_slice());
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let origin = base.get(i).and_then(Value::as_entity);
                (origin, v.clone())
            })
            .collect()
    }
}

fn has_truthy_leaf(value: &Value) -> bool {
    value.leaves().into_iter().any(Value::is_truthy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_resets_stack() {
        let mut ctx = RuleEvaluationContext::new(false);
        ctx.select(vec![EntityId(1)]);
        ctx.branch("Name", vec![Value::from("x")]);
        ctx.select(vec![EntityId(2), EntityId(3)]);
        assert!(ctx.stack().is_empty());
        assert_eq!(ctx.entities(), vec![EntityId(2), EntityId(3)]);
    }

    #[test]
    fn descend_with_values_keeps_applicability() {
        let mut ctx = RuleEvaluationContext::new(false);
        ctx.select(vec![EntityId(1), EntityId(2)]);
        assert!(ctx.descend("Name", vec![Value::from("a"), Value::Null]));
        assert!(ctx.is_applicable());
        assert_eq!(ctx.instances().len(), 2);
        assert_eq!(ctx.stack().base().map(|l| l.selection.len()), Some(2));
    }

    #[test]
    fn descend_without_values_is_inapplicable() {
        let mut ctx = RuleEvaluationContext::new(false);
        ctx.select(vec![EntityId(1)]);
        assert!(!ctx.descend("Name", vec![Value::List(vec![Value::Null])]));
        assert!(!ctx.is_applicable());
        assert!(ctx.instances().is_empty());
    }

    #[test]
    fn branch_restores_selection() {
        let mut ctx = RuleEvaluationContext::new(false);
        ctx.select(vec![EntityId(1), EntityId(2)]);
        ctx.branch("Tag", vec![Value::from("t1"), Value::from("t2")]);
        assert_eq!(ctx.entities(), vec![EntityId(1), EntityId(2)]);
        let top = ctx.top_level(Some("Tag"));
        assert_eq!(top[1], (Some(EntityId(2)), Value::from("t2")));
        assert!(ctx.top_level(Some("Missing")).is_empty());
    }

    #[test]
    fn narrow_keeps_alignment() {
        let mut ctx = RuleEvaluationContext::new(false);
        ctx.select(vec![EntityId(1), EntityId(2), EntityId(3)]);
        ctx.descend("Name", vec![Value::from("a"), Value::from("b"), Value::from("c")]);
        ctx.narrow(&[false, true, true]);
        let paths = ctx.paths(None);
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].values, vec![Value::from("b"), Value::Entity(EntityId(2))]);
    }

    #[test]
    fn applicability_is_sticky() {
        let mut ctx = RuleEvaluationContext::new(true);
        ctx.restrict_applicability(false);
        ctx.restrict_applicability(true);
        assert!(!ctx.is_applicable());
        assert!(ctx.error_on_passed_rule());
    }
}
