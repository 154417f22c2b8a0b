//! Prompts sent to the model during feature extraction and labeling

use crate::llm::ChatMessage;

use super::types::Idea;

/// Schema name for the scoring response
pub const SCORING_SCHEMA_NAME: &str = "idea_embedding";

/// Schema name for the labeling response
pub const LABELING_SCHEMA_NAME: &str = "cluster_naming";

const SCORING_SYSTEM_PROMPT: &str = "أنت خبير في تحليل الأفكار الابتكارية. قم بتحليل الفكرة وإعطاء درجات من 0-100 لكل من: الابتكار، السوق، التقنية، الفريق، الملكية الفكرية، القابلية للتوسع.";

const LABELING_SYSTEM_PROMPT: &str = "أنت خبير في تسمية مجموعات الأفكار الابتكارية. قم بإعطاء اسم ووصف مختصر للمجموعة بناءً على الأفكار المشتركة.";

/// Messages asking for the six dimension scores of one idea
pub fn scoring_messages(idea: &Idea) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SCORING_SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "حلل هذه الفكرة وأعط 6 درجات فقط (أرقام من 0-100):\n\n{}",
            idea.scoring_text()
        )),
    ]
}

/// Messages asking for a bilingual name and description of a cluster.
/// `title_list` is the dash list of member titles.
pub fn labeling_messages(title_list: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(LABELING_SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "أعط اسماً ووصفاً مختصراً (جملة واحدة) لهذه المجموعة من الأفكار:\n\n{}",
            title_list
        )),
    ]
}
