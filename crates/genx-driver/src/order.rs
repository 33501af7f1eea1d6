//! Content ordering for inlined declarations

/// One declaration to place in the output block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration<'a> {
    pub name: &'a str,
    pub text: &'a str,
}

impl<'a> Declaration<'a> {
    pub fn new(name: &'a str, text: &'a str) -> Self {
        Self { name, text }
    }

    /// Whether this declaration mentions `other` by name
    fn references(&self, other: &Declaration<'_>) -> bool {
        !other.name.is_empty() && self.name != other.name && self.text.contains(other.name)
    }
}

/// Order declarations so that every referenced declaration precedes the
/// declarations mentioning it.
///
/// Declarations are visited in input order and each one is emitted after
/// everything it references (depth-first postorder). Independent
/// declarations keep their input order. Inside a reference cycle the
/// member reached first is emitted after the rest of the cycle.
pub fn order_declarations<'a>(declarations: &[Declaration<'a>]) -> Vec<Declaration<'a>> {
    let mut visited = vec![false; declarations.len()];
    let mut ordered = Vec::with_capacity(declarations.len());

    for index in 0..declarations.len() {
        visit(declarations, index, &mut visited, &mut ordered);
    }

    ordered
}

fn visit<'a>(
    declarations: &[Declaration<'a>],
    index: usize,
    visited: &mut [bool],
    ordered: &mut Vec<Declaration<'a>>,
) {
    if visited[index] {
        return;
    }
    visited[index] = true;

    let current = declarations[index];
    for (dependency, candidate) in declarations.iter().enumerate() {
        if current.references(candidate) {
            visit(declarations, dependency, visited, ordered);
        }
    }

    ordered.push(current);
}

/// Ordered declaration texts joined into one block
pub fn render_declarations(declarations: &[Declaration<'_>]) -> String {
    order_declarations(declarations)
        .iter()
        .map(|d| d.text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names<'a>(declarations: &[Declaration<'a>]) -> Vec<&'a str> {
        order_declarations(declarations).iter().map(|d| d.name).collect()
    }

    #[test]
    fn test_dependency_moves_first() {
        let decls = [
            Declaration::new("One", "export type One = { two: Two };"),
            Declaration::new("Two", "export type Two = \"a\" | \"b\";"),
        ];
        assert_eq!(names(&decls), vec!["Two", "One"]);
    }

    #[test]
    fn test_independent_keep_insertion_order() {
        let decls = [
            Declaration::new("A", "type A = string;"),
            Declaration::new("B", "type B = number;"),
            Declaration::new("C", "type C = boolean;"),
        ];
        assert_eq!(names(&decls), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_multiple_forward_dependencies() {
        let decls = [
            Declaration::new("Root", "type Root = { left: Left; right: Right };"),
            Declaration::new("Left", "type Left = { leaf: Leaf };"),
            Declaration::new("Right", "type Right = { leaf: Leaf };"),
            Declaration::new("Leaf", "type Leaf = 1;"),
        ];
        assert_eq!(names(&decls), vec!["Leaf", "Left", "Right", "Root"]);
    }

    #[test]
    fn test_cycle_terminates_with_every_member() {
        let decls = [
            Declaration::new("Node", "type Node = { edge: Edge };"),
            Declaration::new("Edge", "type Edge = { node: Node };"),
            Declaration::new("Self", "type Self = { next: Self };"),
        ];
        assert_eq!(names(&decls), vec!["Edge", "Node", "Self"]);
    }

    #[test]
    fn test_render_joins_with_newlines() {
        let decls = [
            Declaration::new("One", "type One = Two;"),
            Declaration::new("Two", "type Two = 2;"),
        ];
        assert_eq!(render_declarations(&decls), "type Two = 2;\ntype One = Two;");
        assert_eq!(render_declarations(&[]), "");
    }
}
