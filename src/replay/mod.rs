// Navigation over a recorded run

use crate::constants::UNNAMED_STEP;
use crate::timeline::{NodeId, Timeline};

/// One row of the step list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: NodeId,
    pub label: String,
    pub name: String,
    /// 1 for top-level steps
    pub depth: usize,
}

/// Position in a timeline, moved the way a user browses a run
///
/// The root never becomes active; it only groups the top-level steps. Every
/// movement returns whether the position changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    active: NodeId,
}

impl Cursor {
    /// Start at the first top-level step (the root, if the run has none)
    pub fn new(timeline: &Timeline) -> Self {
        let root = timeline.root();
        Cursor {
            active: first_child(timeline, root).unwrap_or(root),
        }
    }

    pub fn active(&self) -> NodeId {
        self.active
    }

    fn move_to(&mut self, target: Option<NodeId>) -> bool {
        match target {
            Some(id) if id != self.active => {
                self.active = id;
                true
            }
            _ => false,
        }
    }

    /// Chronologically next step
    pub fn go_forward(&mut self, timeline: &Timeline) -> bool {
        self.move_to(timeline.after(self.active))
    }

    /// Chronologically previous step
    pub fn go_backward(&mut self, timeline: &Timeline) -> bool {
        let target = timeline
            .before(self.active)
            .filter(|&id| id != timeline.root());
        self.move_to(target)
    }

    /// Next sibling, skipping the current step's sub-steps
    pub fn go_next(&mut self, timeline: &Timeline) -> bool {
        match timeline.get(self.active).and_then(|node| node.next()) {
            Some(next) => self.move_to(Some(next)),
            None => self.go_forward(timeline),
        }
    }

    pub fn go_prev(&mut self, timeline: &Timeline) -> bool {
        match timeline.get(self.active).and_then(|node| node.prev()) {
            Some(prev) => self.move_to(Some(prev)),
            None => self.go_backward(timeline),
        }
    }

    pub fn go_start(&mut self, timeline: &Timeline) -> bool {
        self.move_to(first_child(timeline, timeline.root()))
    }

    pub fn go_end(&mut self, timeline: &Timeline) -> bool {
        let last = timeline
            .get(timeline.root())
            .and_then(|root| root.last_child());
        self.move_to(last)
    }

    /// Jump to the step labelled `label`
    pub fn jump(&mut self, timeline: &Timeline, label: &str) -> bool {
        self.move_to(timeline.find_by_label(label))
    }

    /// `(label, name)` pairs from the top-level ancestor down to the active step
    pub fn breadcrumbs(&self, timeline: &Timeline) -> Vec<(String, String)> {
        let mut crumbs = Vec::new();
        let mut point = Some(self.active);
        while let Some(id) = point {
            if id == timeline.root() {
                break;
            }
            let Some(node) = timeline.get(id) else {
                break;
            };
            crumbs.push((node.label().to_string(), display_name(node.name())));
            point = node.parent();
        }
        crumbs.reverse();
        crumbs
    }
}

/// Every step except the root, in execution order
pub fn entries(timeline: &Timeline) -> Vec<Entry> {
    timeline
        .chronological()
        .filter(|&id| id != timeline.root())
        .filter_map(|id| {
            let node = timeline.get(id)?;
            Some(Entry {
                id,
                label: node.label().to_string(),
                name: display_name(node.name()),
                depth: timeline.depth(id),
            })
        })
        .collect()
}

fn display_name(name: &str) -> String {
    if name.is_empty() {
        UNNAMED_STEP.to_string()
    } else {
        name.to_string()
    }
}

fn first_child(timeline: &Timeline, id: NodeId) -> Option<NodeId> {
    timeline.get(id).and_then(|node| node.first_child())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Controller, ControllerConfig, Program};
    use crate::grammar::Grammar;
    use crate::snapshot::Snapshot;
    use pretty_assertions::assert_eq;

    /// 1, 2 (2.1, 2.2), 3
    fn run() -> Controller {
        let root = Program::new(|c| {
            c.schedule(Program::new(|c| c.set_name("one")))?;
            c.schedule(Program::new(|c| {
                c.set_name("two")?;
                c.schedule(Program::new(|c| c.set_name("two a")))?;
                c.schedule(Program::new(|_| Ok(())))?;
                Ok(())
            }))?;
            c.schedule(Program::new(|c| c.set_name("three")))?;
            Ok(())
        });
        let initial = Snapshot::new(Grammar::new("S").unwrap());
        let mut c = Controller::with_root(initial, root, ControllerConfig::default());
        c.execute().unwrap();
        c
    }

    fn label(c: &Controller, cursor: &Cursor) -> String {
        c.timeline().node(cursor.active()).unwrap().label().to_string()
    }

    #[test]
    fn test_forward_and_backward() {
        let c = run();
        let t = c.timeline();
        let mut cursor = Cursor::new(t);
        let mut seen = vec![label(&c, &cursor)];
        while cursor.go_forward(t) {
            seen.push(label(&c, &cursor));
        }
        assert_eq!(seen, vec!["1", "2", "2.1", "2.2", "3"]);

        while cursor.go_backward(t) {}
        assert_eq!(label(&c, &cursor), "1");
    }

    #[test]
    fn test_sibling_moves_skip_children() {
        let c = run();
        let t = c.timeline();
        let mut cursor = Cursor::new(t);
        assert!(cursor.go_next(t));
        assert!(cursor.go_next(t));
        assert_eq!(label(&c, &cursor), "3");

        assert!(cursor.jump(t, "2.1"));
        assert!(cursor.go_prev(t));
        assert_eq!(label(&c, &cursor), "2");
    }

    #[test]
    fn test_start_end() {
        let c = run();
        let t = c.timeline();
        let mut cursor = Cursor::new(t);
        assert!(!cursor.go_start(t));
        assert!(cursor.go_end(t));
        assert_eq!(label(&c, &cursor), "3");
        assert!(!cursor.go_forward(t));
    }

    #[test]
    fn test_breadcrumbs_and_entries() {
        let c = run();
        let t = c.timeline();
        let mut cursor = Cursor::new(t);
        cursor.jump(t, "2.2");
        assert_eq!(
            cursor.breadcrumbs(t),
            vec![
                ("2".to_string(), "two".to_string()),
                ("2.2".to_string(), UNNAMED_STEP.to_string()),
            ]
        );

        let rows: Vec<(String, usize)> = entries(t)
            .into_iter()
            .map(|entry| (entry.label, entry.depth))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("1".to_string(), 1),
                ("2".to_string(), 1),
                ("2.1".to_string(), 2),
                ("2.2".to_string(), 2),
                ("3".to_string(), 1),
            ]
        );
    }
}
