/// Generic tree view for ratatui
///
/// Every node carries an optional typed payload, so the dashboard gets its
/// `ServiceNode` back from a selection without any runtime casts. The tree
/// is flattened into rows on `set_root`; selection is a row index.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, List, ListItem, ListState},
    Frame,
};

pub struct TreeNode<T> {
    pub label: Line<'static>,
    pub color: Color,
    pub payload: Option<T>,
    pub selectable: bool,
    pub children: Vec<TreeNode<T>>,
}

impl<T> TreeNode<T> {
    pub fn new(label: impl Into<Line<'static>>) -> Self {
        Self {
            label: label.into(),
            color: Color::White,
            payload: None,
            selectable: true,
            children: Vec::new(),
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn payload(mut self, payload: T) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    pub fn add_child(&mut self, child: TreeNode<T>) {
        self.children.push(child);
    }
}

/// One visible line of the flattened tree
pub struct TreeRow<T> {
    pub depth: usize,
    pub last_sibling: bool,
    pub label: Line<'static>,
    pub color: Color,
    pub payload: Option<T>,
    pub selectable: bool,
}

impl<T> TreeRow<T> {
    pub fn text(&self) -> String {
        self.label.spans.iter().map(|s| s.content.as_ref()).collect()
    }
}

pub struct TreeView<T> {
    rows: Vec<TreeRow<T>>,
    selected: usize,
}

impl<T> TreeView<T> {
    pub fn new(root: TreeNode<T>) -> Self {
        let mut view = Self {
            rows: Vec::new(),
            selected: 0,
        };
        view.set_root(root);
        view
    }

    /// Replace the whole tree; the cursor stays on the same row index if possible
    pub fn set_root(&mut self, root: TreeNode<T>) {
        self.rows.clear();
        flatten(root, 0, true, &mut self.rows);
        if self.selected >= self.rows.len() || !self.rows[self.selected].selectable {
            self.selected = 0;
        }
    }

    pub fn rows(&self) -> &[TreeRow<T>] {
        &self.rows
    }

    pub fn selected(&self) -> Option<&TreeRow<T>> {
        self.rows.get(self.selected)
    }

    pub fn selected_payload(&self) -> Option<&T> {
        self.selected().and_then(|row| row.payload.as_ref())
    }

    pub fn select_next(&mut self) {
        if let Some(offset) = self.rows[self.selected + 1..].iter().position(|r| r.selectable) {
            self.selected += offset + 1;
        }
    }

    pub fn select_prev(&mut self) {
        if let Some(idx) = self.rows[..self.selected].iter().rposition(|r| r.selectable) {
            self.selected = idx;
        }
    }

    /// Move the cursor to the first selectable row whose payload matches
    pub fn select_where<F>(&mut self, mut predicate: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        let found = self
            .rows
            .iter()
            .position(|r| r.selectable && r.payload.as_ref().map_or(false, &mut predicate));

        match found {
            Some(idx) => {
                self.selected = idx;
                true
            }
            None => false,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, block: Block) {
        let items: Vec<ListItem> = self
            .rows
            .iter()
            .map(|row| {
                let mut spans = vec![Span::styled(branch_prefix(row), Style::default().fg(Color::DarkGray))];
                spans.extend(row.label.spans.iter().cloned());
                ListItem::new(Line::from(spans)).style(Style::default().fg(row.color))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }
}

fn flatten<T>(node: TreeNode<T>, depth: usize, last_sibling: bool, rows: &mut Vec<TreeRow<T>>) {
    rows.push(TreeRow {
        depth,
        last_sibling,
        label: node.label,
        color: node.color,
        payload: node.payload,
        selectable: node.selectable,
    });

    let count = node.children.len();
    for (i, child) in node.children.into_iter().enumerate() {
        flatten(child, depth + 1, i + 1 == count, rows);
    }
}

fn branch_prefix<T>(row: &TreeRow<T>) -> String {
    if row.depth == 0 {
        return String::new();
    }
    let branch = if row.last_sibling { "└─ " } else { "├─ " };
    format!("{}{}", "   ".repeat(row.depth - 1), branch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> TreeNode<u32> {
        let mut root = TreeNode::new("root");
        let mut a = TreeNode::new("a").payload(1);
        a.add_child(TreeNode::new("a-dep").selectable(false));
        let b = TreeNode::new("b").payload(2);
        let mut c = TreeNode::new("c").payload(3);
        c.add_child(TreeNode::new("c-dep1").selectable(false));
        c.add_child(TreeNode::new("c-dep2").selectable(false));
        root.add_child(a);
        root.add_child(b);
        root.add_child(c);
        root
    }

    #[test]
    fn test_flatten_order() {
        let view = TreeView::new(sample_tree());
        let labels: Vec<String> = view.rows().iter().map(|r| r.text()).collect();
        assert_eq!(labels, ["root", "a", "a-dep", "b", "c", "c-dep1", "c-dep2"]);
        assert_eq!(view.rows()[2].depth, 2);
        assert!(view.rows()[6].last_sibling);
        assert!(!view.rows()[5].last_sibling);
    }

    #[test]
    fn test_navigation_skips_unselectable_rows() {
        let mut view = TreeView::new(sample_tree());
        assert_eq!(view.selected_payload(), None);

        view.select_next();
        assert_eq!(view.selected_payload(), Some(&1));
        view.select_next();
        assert_eq!(view.selected_payload(), Some(&2));
        view.select_next();
        assert_eq!(view.selected_payload(), Some(&3));
        view.select_next();
        assert_eq!(view.selected_payload(), Some(&3));

        view.select_prev();
        assert_eq!(view.selected_payload(), Some(&2));
        view.select_prev();
        view.select_prev();
        assert!(view.selected_payload().is_none());
        view.select_prev();
        assert!(view.selected_payload().is_none());
    }

    #[test]
    fn test_select_where() {
        let mut view = TreeView::new(sample_tree());
        assert!(view.select_where(|v| *v == 3));
        assert_eq!(view.selected().map(|r| r.text()).as_deref(), Some("c"));
        assert!(!view.select_where(|v| *v == 42));
        assert_eq!(view.selected().map(|r| r.text()).as_deref(), Some("c"));
    }

    #[test]
    fn test_set_root_clamps_selection() {
        let mut view = TreeView::new(sample_tree());
        view.select_where(|v| *v == 3);
        view.set_root(TreeNode::new("root"));
        assert!(view.selected_payload().is_none());
    }

    #[test]
    fn test_branch_prefix() {
        let view = TreeView::new(sample_tree());
        assert_eq!(branch_prefix(&view.rows()[0]), "");
        assert_eq!(branch_prefix(&view.rows()[1]), "├─ ");
        assert_eq!(branch_prefix(&view.rows()[2]), "   └─ ");
        assert_eq!(branch_prefix(&view.rows()[4]), "└─ ");
    }
}
