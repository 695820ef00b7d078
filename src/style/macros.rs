use super::{Macro, MacroId, RenderNode, StyleError, TextTarget};

/// Reject macros that call themselves, directly or through other macros.
///
/// A depth-first walk over the call graph keeps the macros on the current
/// path on a stack. Reaching one of them again closes a cycle.
pub(super) fn check_cycles(macros: &[Macro]) -> Result<(), StyleError> {
    let mut walk = Walk {
        macros,
        visited: vec![false; macros.len()],
        on_stack: vec![false; macros.len()],
        stack: Vec::new(),
    };

    for i in 0..macros.len() {
        walk.visit(MacroId(i))?;
    }
    Ok(())
}

struct Walk<'a> {
    macros: &'a [Macro],
    visited: Vec<bool>,
    on_stack: Vec<bool>,
    stack: Vec<MacroId>,
}

impl Walk<'_> {
    fn visit(&mut self, id: MacroId) -> Result<(), StyleError> {
        if self.on_stack[id.0] {
            let start = self.stack.iter().position(|&m| m == id).unwrap_or_default();
            let chain = self.stack[start..]
                .iter()
                .chain(std::iter::once(&id))
                .map(|m| self.macros[m.0].name.clone())
                .collect();
            return Err(StyleError::CircularMacro { chain });
        }
        if self.visited[id.0] {
            return Ok(());
        }

        self.visited[id.0] = true;
        self.on_stack[id.0] = true;
        self.stack.push(id);

        let mut callees = Vec::new();
        collect_calls(&self.macros[id.0].children, &mut callees);
        for callee in callees {
            self.visit(callee)?;
        }

        self.stack.pop();
        self.on_stack[id.0] = false;
        Ok(())
    }
}

/// Collect the macros called anywhere below `nodes`.
fn collect_calls(nodes: &[RenderNode], out: &mut Vec<MacroId>) {
    for node in nodes {
        match node {
            RenderNode::Text(text) => {
                if let TextTarget::Macro(id) = text.target {
                    out.push(id);
                }
            }
            RenderNode::Group(group) => collect_calls(&group.children, out),
            RenderNode::Choose(choose) => {
                for branch in &choose.branches {
                    collect_calls(&branch.children, out);
                }
                if let Some(otherwise) = &choose.otherwise {
                    collect_calls(otherwise, out);
                }
            }
            RenderNode::Names(names) => {
                if let Some(substitute) = &names.substitute {
                    collect_calls(substitute, out);
                }
            }
            RenderNode::Date(_) | RenderNode::Number(_) | RenderNode::Label(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::StyleError;
    use crate::style::StyleDocument;

    fn parse(macros: &str) -> Result<StyleDocument, StyleError> {
        StyleDocument::parse(
            format!(
                r#"<style version="1.0">
                     {macros}
                     <citation><layout><text macro="a"/></layout></citation>
                   </style>"#
            )
            .as_bytes(),
        )
    }

    #[test]
    fn test_acyclic_macros() {
        let style = parse(
            r#"<macro name="a"><text macro="b"/><group><text macro="c"/></group></macro>
               <macro name="b"><text macro="c"/></macro>
               <macro name="c"><text variable="title"/></macro>"#,
        )
        .unwrap();
        assert_eq!(style.macros.len(), 3);
    }

    #[test]
    fn test_self_reference() {
        let err = parse(r#"<macro name="a"><text macro="a"/></macro>"#).unwrap_err();
        assert_eq!(err, StyleError::CircularMacro { chain: vec!["a".into(), "a".into()] });
    }

    #[test]
    fn test_indirect_cycle() {
        let err = parse(
            r#"<macro name="a"><text macro="b"/></macro>
               <macro name="b">
                 <choose><if variable="title"><text value="x"/></if>
                 <else><names variable="author"><substitute><text macro="c"/></substitute></names></else>
                 </choose>
               </macro>
               <macro name="c"><text macro="a"/></macro>"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            StyleError::CircularMacro {
                chain: vec!["a".into(), "b".into(), "c".into(), "a".into()]
            }
        );
        assert_eq!(err.to_string(), "circular macro reference: a -> b -> c -> a");
    }
}
