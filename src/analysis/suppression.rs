use super::Finding;
use crate::graph::Graph;

const SUPPRESS_ANNOTATIONS: &[&str] = &["SuppressLint", "Suppress", "SuppressWarnings"];

/// True when a declaration enclosing the finding carries a suppression
/// annotation naming its code, its name or `all`
pub fn is_suppressed(graph: &Graph, finding: &Finding) -> bool {
    graph
        .enclosing_declarations(&finding.location)
        .into_iter()
        .flat_map(|decl| decl.annotations.iter())
        .filter(|a| SUPPRESS_ANNOTATIONS.iter().any(|name| a.is(name)))
        .flat_map(|a| a.string_values())
        .any(|value| {
            value.eq_ignore_ascii_case("all")
                || value.eq_ignore_ascii_case(finding.issue.code())
                || value == finding.issue.name()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::LintIssue;
    use crate::discovery::FileType;
    use crate::graph::GraphBuilder;
    use std::path::Path;

    fn graph(source: &str) -> Graph {
        let mut builder = GraphBuilder::new();
        builder
            .process_source(Path::new("Store.java"), FileType::Java, source)
            .unwrap();
        builder.build()
    }

    fn finding_at_call(graph: &Graph, issue: LintIssue) -> Finding {
        let call = &graph.calls()[0];
        Finding::new(issue, call.location.clone(), call.name.clone())
    }

    #[test]
    fn test_suppressed_by_code_on_method() {
        let graph = graph(
            r#"
class Store {
    @SuppressLint("AS001")
    String read() { return SystemProperties.get("x"); }
}
"#,
        );
        let finding = finding_at_call(&graph, LintIssue::SystemPropertiesUsage);
        assert!(is_suppressed(&graph, &finding));
    }

    #[test]
    fn test_suppressed_by_name_on_class() {
        let graph = graph(
            r#"
@SuppressLint({"NewApi", "AvoidSystemPropertiesUsage"})
class Store {
    String read() { return SystemProperties.get("x"); }
}
"#,
        );
        let finding = finding_at_call(&graph, LintIssue::SystemPropertiesUsage);
        assert!(is_suppressed(&graph, &finding));
    }

    #[test]
    fn test_other_rule_does_not_suppress() {
        let graph = graph(
            r#"
class Store {
    @SuppressLint("AS002")
    String read() { return SystemProperties.get("x"); }
}
"#,
        );
        let finding = finding_at_call(&graph, LintIssue::SystemPropertiesUsage);
        assert!(!is_suppressed(&graph, &finding));
    }
}
