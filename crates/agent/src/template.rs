//! Placeholder substitution
//!
//! Literal find-and-replace of `{agent}`, `{customer}`, `{company}` and
//! `{goal}`. No escaping, no nesting; tokens that do not appear are simply
//! not replaced.

use call_sim_core::Scenario;

/// Substitute scenario fields into a script line
pub fn fill_placeholders(template: &str, scenario: &Scenario) -> String {
    template
        .replace("{agent}", &scenario.agent_name)
        .replace("{customer}", &scenario.customer_name)
        .replace("{company}", &scenario.company_name)
        .replace("{goal}", &scenario.goal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Scenario {
        Scenario {
            agent_name: "Quin".into(),
            customer_name: "Sam".into(),
            company_name: "Acme".into(),
            goal: "fix the panels".into(),
        }
    }

    #[test]
    fn test_fill_all_tokens() {
        let line = fill_placeholders("Hi {customer}, this is {agent} from {company}.", &scenario());
        assert_eq!(line, "Hi Sam, this is Quin from Acme.");
        assert!(!line.contains('{'));
    }

    #[test]
    fn test_repeated_and_goal_tokens() {
        let line = fill_placeholders("{customer}? {customer}! We want to {goal}.", &scenario());
        assert_eq!(line, "Sam? Sam! We want to fix the panels.");
    }

    #[test]
    fn test_unknown_tokens_left_alone() {
        let line = fill_placeholders("Ref {ticket} for {customer}", &scenario());
        assert_eq!(line, "Ref {ticket} for Sam");
    }
}
