// src/quiz/sample.rs

use uuid::Uuid;

use crate::models::quiz::{NewQuiz, Question};

pub const SAMPLE_PASSING_SCORE: i32 = 70;
pub const SAMPLE_TIME_LIMIT_MINUTES: i32 = 10;

fn question(
    id: i32,
    prompt: &str,
    options: [&str; 4],
    correct_option: usize,
    explanation: &str,
) -> Question {
    Question {
        id,
        prompt: prompt.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_option,
        explanation: Some(explanation.to_string()),
    }
}

/// The five-question quiz seeded for a course that has none yet.
pub fn sample_quiz(course_id: Uuid) -> NewQuiz {
    NewQuiz {
        course_id,
        title: "Course Knowledge Check".to_string(),
        description: Some(
            "Answer all five questions to test what you learned in this course.".to_string(),
        ),
        questions: vec![
            question(
                1,
                "What does HTML stand for?",
                [
                    "Hyper Text Markup Language",
                    "High Tech Modern Language",
                    "Home Tool Markup Language",
                    "Hyperlinks and Text Markup Language",
                ],
                0,
                "HTML is the Hyper Text Markup Language used to structure web pages.",
            ),
            question(
                2,
                "Which language is primarily used to style web pages?",
                ["Python", "CSS", "SQL", "Bash"],
                1,
                "CSS (Cascading Style Sheets) controls layout and presentation.",
            ),
            question(
                3,
                "Which HTTP method is conventionally used to create a resource?",
                ["GET", "DELETE", "POST", "HEAD"],
                2,
                "POST submits data to create a new resource.",
            ),
            question(
                4,
                "What does SQL stand for?",
                [
                    "Simple Question Language",
                    "Structured Query Language",
                    "Sequential Query Logic",
                    "Server Queue Language",
                ],
                1,
                "SQL is the Structured Query Language for relational databases.",
            ),
            question(
                5,
                "Which status code means a resource was not found?",
                ["200", "301", "500", "404"],
                3,
                "404 Not Found is returned when the server has no such resource.",
            ),
        ],
        time_limit_minutes: Some(SAMPLE_TIME_LIMIT_MINUTES),
        passing_score: SAMPLE_PASSING_SCORE,
    }
}
