//! Roadmap generation: prompt, call the model, parse.

use tracing::{info, warn};

use crate::client::{GenerateError, ModelClient, OutputKind};
use crate::parser::{parse_questions, parse_steps};
use crate::prompts::{question_prompt, step_prompt};
use crate::roadmap::{McqQuestion, Roadmap, RoadmapStep};

/// Outcome of a full generation run.
///
/// Steps are always present. Questions carry their own result so that a
/// failed question pass does not throw away good steps.
#[derive(Debug)]
pub struct Generation {
    pub topic: String,
    pub steps: Vec<RoadmapStep>,
    pub questions: Result<Vec<McqQuestion>, GenerateError>,
}

impl Generation {
    /// Builds a roadmap stamped with the current time. Failed questions
    /// become an empty list.
    pub fn into_roadmap(self, title: impl Into<String>) -> Roadmap {
        Roadmap::created_now(title, self.steps, self.questions.unwrap_or_default())
    }
}

/// Asks the model for a roadmap on `topic` and parses its steps.
pub fn generate_steps(
    client: &impl ModelClient,
    topic: &str,
) -> Result<Vec<RoadmapStep>, GenerateError> {
    let text = client.generate(&step_prompt(topic))?;
    let steps = parse_steps(&text);

    if steps.is_empty() {
        warn!(topic, response_len = text.len(), "steps_unparseable");
        return Err(GenerateError::Unparseable(OutputKind::Steps));
    }

    info!(topic, count = steps.len(), "steps_generated");
    Ok(steps)
}

/// Asks the model for practice questions on `steps` and parses them.
pub fn generate_questions(
    client: &impl ModelClient,
    steps: &[RoadmapStep],
) -> Result<Vec<McqQuestion>, GenerateError> {
    let text = client.generate(&question_prompt(steps))?;
    let questions = parse_questions(&text);

    if questions.is_empty() {
        warn!(response_len = text.len(), "questions_unparseable");
        return Err(GenerateError::Unparseable(OutputKind::Questions));
    }

    info!(count = questions.len(), "questions_generated");
    Ok(questions)
}

/// Generates steps, then questions for those steps.
///
/// The question call is only made once the steps succeeded.
pub fn generate(client: &impl ModelClient, topic: &str) -> Result<Generation, GenerateError> {
    let steps = generate_steps(client, topic)?;
    let questions = generate_questions(client, &steps);

    Ok(Generation {
        topic: topic.to_string(),
        steps,
        questions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replies with canned results in order and records the prompts it saw.
    struct ScriptedClient {
        replies: RefCell<VecDeque<Result<String, GenerateError>>>,
        prompts: RefCell<Vec<String>>,
    }

    impl ScriptedClient {
        fn new(replies: Vec<Result<&str, GenerateError>>) -> Self {
            Self {
                replies: RefCell::new(
                    replies
                        .into_iter()
                        .map(|r| r.map(str::to_string))
                        .collect(),
                ),
                prompts: RefCell::new(Vec::new()),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.borrow().clone()
        }
    }

    impl ModelClient for ScriptedClient {
        fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
            self.prompts.borrow_mut().push(prompt.to_string());
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(GenerateError::Transport("no scripted reply".into())))
        }
    }

    const STEPS: &str = "Step 1: Basics\nDescription: Learn the fundamentals\nStep 2: Advanced\nDescription: Go deeper";
    const QUESTIONS: &str = "Q1: What comes first?\nA) Basics\nB) Advanced\nC) Neither\nD) Both\nCorrect: A";

    #[test]
    fn test_generate_happy_path() {
        let client = ScriptedClient::new(vec![Ok(STEPS), Ok(QUESTIONS)]);
        let generation = generate(&client, "Machine Learning").unwrap();

        assert_eq!(generation.topic, "Machine Learning");
        assert_eq!(generation.steps.len(), 2);
        assert_eq!(generation.questions.as_ref().unwrap().len(), 1);

        let prompts = client.prompts();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0], step_prompt("Machine Learning"));
        assert!(prompts[1].contains("1. Basics: Learn the fundamentals\n2. Advanced: Go deeper"));
    }

    #[test]
    fn test_step_transport_failure_skips_question_call() {
        let client = ScriptedClient::new(vec![Err(GenerateError::Transport("refused".into()))]);
        let err = generate(&client, "Rust").unwrap_err();

        assert_eq!(err, GenerateError::Transport("refused".into()));
        assert_eq!(client.prompts().len(), 1);
    }

    #[test]
    fn test_unparseable_steps_are_distinct_from_transport() {
        let client = ScriptedClient::new(vec![Ok("I'm sorry, I can't help with that.")]);
        let err = generate(&client, "Rust").unwrap_err();

        assert_eq!(err, GenerateError::Unparseable(OutputKind::Steps));
        assert_eq!(client.prompts().len(), 1);
    }

    #[test]
    fn test_question_failure_keeps_steps() {
        let client = ScriptedClient::new(vec![Ok(STEPS), Ok("no questions here")]);
        let generation = generate(&client, "Rust").unwrap();

        assert_eq!(generation.steps.len(), 2);
        assert_eq!(
            generation.questions,
            Err(GenerateError::Unparseable(OutputKind::Questions))
        );
    }

    #[test]
    fn test_question_transport_failure_keeps_steps() {
        let client = ScriptedClient::new(vec![Ok(STEPS), Err(GenerateError::Transport("HTTP 500".into()))]);
        let generation = generate(&client, "Rust").unwrap();

        assert_eq!(generation.steps.len(), 2);
        assert!(matches!(generation.questions, Err(GenerateError::Transport(_))));
    }

    #[test]
    fn test_into_roadmap_with_failed_questions() {
        let client = ScriptedClient::new(vec![Ok(STEPS), Ok("")]);
        let roadmap = generate(&client, "Rust").unwrap().into_roadmap("My Rust Path");

        assert_eq!(roadmap.title, "My Rust Path");
        assert_eq!(roadmap.steps.len(), 2);
        assert!(roadmap.questions.is_empty());
    }

    #[test]
    fn test_into_roadmap_keeps_questions() {
        let client = ScriptedClient::new(vec![Ok(STEPS), Ok(QUESTIONS)]);
        let roadmap = generate(&client, "Rust").unwrap().into_roadmap("Rust");

        assert_eq!(roadmap.questions.len(), 1);
        assert_eq!(roadmap.questions[0].correct_answer, "A");
    }
}
