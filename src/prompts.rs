//! Prompt templates sent to the model.
//!
//! The output format each prompt demands is exactly what [`crate::parser`]
//! recognizes. Change both together.

use crate::roadmap::RoadmapStep;

/// Prompt asking for a five-step learning roadmap on `topic`.
pub fn step_prompt(topic: &str) -> String {
    format!(
        r#"Create a learning roadmap for {topic} with exactly 5 steps. Each step should have a title and description. Format the response exactly like this, with no additional text:

Step 1: [title]
Description: [description]
Step 2: [title]
Description: [description]
Step 3: [title]
Description: [description]
Step 4: [title]
Description: [description]
Step 5: [title]
Description: [description]"#
    )
}

/// Prompt asking for five multiple-choice questions covering `steps`.
pub fn question_prompt(steps: &[RoadmapStep]) -> String {
    format!(
        r#"Generate 5 multiple choice questions based on these learning steps:
{}

Format each question exactly like this, with no additional text:

Q1: [question]
A) [option1]
B) [option2]
C) [option3]
D) [option4]
Correct: [A/B/C/D]

Q2: [question]
...and so on for all 5 questions."#,
        numbered_steps(steps)
    )
}

/// Renders steps as `1. Title: Description` lines.
fn numbered_steps(steps: &[RoadmapStep]) -> String {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}: {}", i + 1, step.title, step.description))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(title: &str, description: &str) -> RoadmapStep {
        RoadmapStep {
            title: title.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_step_prompt_embeds_topic() {
        let prompt = step_prompt("Machine Learning");
        assert!(prompt.starts_with("Create a learning roadmap for Machine Learning with exactly 5 steps."));
    }

    #[test]
    fn test_step_prompt_lists_format_lines() {
        let prompt = step_prompt("Rust");
        for n in 1..=5 {
            assert!(prompt.contains(&format!("Step {n}: [title]\nDescription: [description]")));
        }
        assert!(prompt.ends_with("Description: [description]"));
    }

    #[test]
    fn test_step_prompt_is_deterministic() {
        assert_eq!(step_prompt("Go"), step_prompt("Go"));
    }

    #[test]
    fn test_step_prompt_keeps_braces_in_topic() {
        assert!(step_prompt("{topic}").contains("roadmap for {topic} with"));
    }

    #[test]
    fn test_question_prompt_numbers_steps() {
        let prompt = question_prompt(&[
            step("Basics", "Learn the fundamentals"),
            step("Advanced", "Go deeper"),
        ]);
        assert!(prompt.contains(
            "based on these learning steps:\n1. Basics: Learn the fundamentals\n2. Advanced: Go deeper\n\n"
        ));
    }

    #[test]
    fn test_question_prompt_lists_format_block() {
        let prompt = question_prompt(&[step("A", "B")]);
        assert!(prompt.contains(
            "Q1: [question]\nA) [option1]\nB) [option2]\nC) [option3]\nD) [option4]\nCorrect: [A/B/C/D]"
        ));
        assert!(prompt.ends_with("...and so on for all 5 questions."));
    }

    #[test]
    fn test_question_prompt_with_no_steps() {
        let prompt = question_prompt(&[]);
        assert!(prompt.starts_with("Generate 5 multiple choice questions based on these learning steps:\n\n"));
    }
}
