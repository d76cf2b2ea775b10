use crate::rules::types::{Category, Confidence, Rule, Severity};
use regex::Regex;

pub fn rules() -> Vec<Rule> {
    vec![ci_001(), ci_002(), ci_003(), ci_004()]
}

fn ci_001() -> Rule {
    Rule {
        id: "CI-001",
        name: "Dynamic eval",
        category: Category::CodeInjection,
        severity: Severity::High,
        confidence: Confidence::Medium,
        patterns: vec![Regex::new(r"\beval\s*\(").expect("CI-001: invalid regex")],
        exclusions: vec![
            // literal_eval is the safe counterpart
            Regex::new(r"ast\.literal_eval").expect("CI-001: invalid regex"),
        ],
        message: "Dynamic eval() call detected",
    }
}

fn ci_002() -> Rule {
    Rule {
        id: "CI-002",
        name: "Dynamic exec or import",
        category: Category::CodeInjection,
        severity: Severity::High,
        confidence: Confidence::Medium,
        patterns: vec![
            Regex::new(r"\bexec\s*\(").expect("CI-002: invalid regex"),
            Regex::new(r"__import__\s*\(").expect("CI-002: invalid regex"),
        ],
        exclusions: vec![],
        message: "Dynamic exec()/__import__() call detected",
    }
}

fn ci_003() -> Rule {
    Rule {
        id: "CI-003",
        name: "Shell-mode subprocess",
        category: Category::CodeInjection,
        severity: Severity::High,
        confidence: Confidence::High,
        patterns: vec![
            Regex::new(r"subprocess\.(?:call|run|Popen|check_output|check_call)\s*\([^)]*shell\s*=\s*True")
                .expect("CI-003: invalid regex"),
        ],
        exclusions: vec![],
        message: "subprocess invoked with shell=True",
    }
}

fn ci_004() -> Rule {
    Rule {
        id: "CI-004",
        name: "os.system call",
        category: Category::CodeInjection,
        severity: Severity::High,
        confidence: Confidence::Medium,
        patterns: vec![Regex::new(r"os\.system\s*\(").expect("CI-004: invalid regex")],
        exclusions: vec![],
        message: "os.system() shell execution detected",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ci_001_detects_eval_not_literal_eval() {
        let rule = ci_001();
        assert!(rule.patterns.iter().any(|p| p.is_match("eval(user_input)")));
        let safe = "ast.literal_eval(user_input)";
        assert!(rule.exclusions.iter().any(|e| e.is_match(safe)));
    }

    #[test]
    fn test_ci_002_detects_exec_and_import() {
        let rule = ci_002();
        let test_cases = vec![
            ("exec(payload)", true),
            ("__import__('os')", true),
            ("executor.submit(fn)", false),
        ];
        for (input, should_match) in test_cases {
            let matched = rule.patterns.iter().any(|p| p.is_match(input));
            assert_eq!(matched, should_match, "Failed for: {input}");
        }
    }

    #[test]
    fn test_ci_003_detects_shell_true() {
        let rule = ci_003();
        assert!(
            rule.patterns
                .iter()
                .any(|p| p.is_match("subprocess.run(cmd, shell=True)"))
        );
        assert!(
            !rule
                .patterns
                .iter()
                .any(|p| p.is_match("subprocess.run([\"ls\"], check=True)"))
        );
    }

    #[test]
    fn test_ci_004_detects_os_system() {
        let rule = ci_004();
        assert!(rule.patterns.iter().any(|p| p.is_match("os.system(user_input)")));
        assert!(!rule.patterns.iter().any(|p| p.is_match("os.sysconf('SC_CLK_TCK')")));
    }
}
