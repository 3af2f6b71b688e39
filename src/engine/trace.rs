//! Diagnostic trace of rule invocations.
//!
//! Every rule invocation produces a node recording its name and outcome;
//! child invocations are appended in invocation order, failed attempts
//! included. The tree never influences parsing decisions. Whether failed
//! nodes are shown is a presentation choice, so recording and rendering are
//! kept separate.

/// One rule invocation and its children, in invocation order.
///
/// The child list is unbounded; a parse retains the tree only for the
/// duration of one top-level invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceNode {
    pub rule_name: &'static str,
    pub matched: bool,
    pub children: Vec<TraceNode>,
}

impl TraceNode {
    /// Render the successful invocations as indented text, one line per
    /// node: `"<name> <0|1>"`, children one space deeper.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0, false);
        out
    }

    /// Render every retained invocation, failed attempts included.
    #[must_use]
    pub fn render_all(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0, true);
        out
    }

    // Depth is threaded as a parameter so concurrent renders cannot
    // interfere through shared indentation state.
    fn render_into(&self, out: &mut String, depth: usize, include_failures: bool) {
        if !self.matched && !include_failures {
            return;
        }
        for _ in 0..depth {
            out.push(' ');
        }
        out.push_str(self.rule_name);
        out.push(' ');
        out.push_str(if self.matched { "1" } else { "0" });
        out.push('\n');
        for child in &self.children {
            child.render_into(out, depth + 1, include_failures);
        }
    }
}
