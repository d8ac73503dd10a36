//! Prompt construction for role conversations and skill invocations.
//!
//! Prompts are assembled from labeled sections separated by a blank line.
//! Sections whose content is empty are left out entirely.

use crate::catalog::{RoleDefinition, SkillDefinition};
use crate::error::PromptError;
use crate::history::{format_history, ConversationMessage};

/// Separator between knowledge-focus topics.
const FOCUS_DELIMITER: &str = "、";

const CONVERSATION_DIRECTIVES: &str = "对话要求：\n\
     1. 使用中文第一人称叙述，保持角色独特的语气。\n\
     2. 回答长度控制在 2-4 句，可适当使用换行或短列表。\n\
     3. 若用户提及过往事件，请结合上下文回应；避免跳出角色设定。";

/// Final line of every conversation prompt.
pub const CONVERSATION_CLOSING: &str = "请给出你的回答，只返回角色的话语。";

/// Final line of every skill prompt.
pub const SKILL_CLOSING: &str = "请输出符合技能目标的内容，保持角色语气，并使用地道中文。";

/// Ordered prompt sections; blank entries are skipped.
#[derive(Default)]
struct Sections(Vec<String>);

impl Sections {
    fn push(&mut self, section: impl Into<String>) {
        let section = section.into();
        if !section.trim().is_empty() {
            self.0.push(section);
        }
    }

    /// Pushes `label` + `body` only when `body` has content.
    fn push_labeled(&mut self, label: &str, body: &str) {
        if !body.trim().is_empty() {
            self.0.push(format!("{label}{body}"));
        }
    }

    fn finish(self) -> String {
        self.0.join("\n\n")
    }
}

/// Identity, background and style: shared by both prompt kinds.
fn role_header(role: &RoleDefinition) -> Sections {
    let mut sections = Sections::default();

    let identity = match role.tagline.as_deref().filter(|t| !t.trim().is_empty()) {
        Some(tagline) => format!(
            "角色设定：{}（{}），{}",
            role.name,
            role.alias_or_name(),
            tagline
        ),
        None => format!("角色设定：{}（{}）", role.name, role.alias_or_name()),
    };
    sections.push(identity);
    sections.push_labeled("背景补充：", &role.background);
    sections.push_labeled("表达风格：", &role.style);
    sections
}

/// Builds the prompt for an open-ended in-character reply.
pub fn build_conversation_prompt(
    role: &RoleDefinition,
    user_text: &str,
    history: &[ConversationMessage],
) -> String {
    let mut sections = role_header(role);

    sections.push_labeled(
        "擅长分享的主题：",
        &role.knowledge_focus.join(FOCUS_DELIMITER),
    );
    sections.push(CONVERSATION_DIRECTIVES);
    if !history.is_empty() {
        sections.push(format!(
            "最近的对话记录：\n{}",
            format_history(history, &role.name)
        ));
    }
    sections.push(format!("用户最新的语音转写内容：{}", user_text.trim()));
    sections.push(CONVERSATION_CLOSING);

    sections.finish()
}

/// Builds the prompt for a skill invocation.
///
/// # Errors
///
/// Returns [`PromptError::MissingUserInput`] when the skill requires caller
/// text and `user_input` is absent or blank.
pub fn build_skill_prompt(
    role: &RoleDefinition,
    skill: &SkillDefinition,
    user_input: Option<&str>,
    history: &[ConversationMessage],
) -> Result<String, PromptError> {
    let user_input = user_input.map(str::trim).filter(|input| !input.is_empty());
    if skill.requires_user_input && user_input.is_none() {
        return Err(PromptError::MissingUserInput {
            skill_id: skill.id.clone(),
        });
    }

    let mut sections = role_header(role);
    sections.push_labeled("技能目标：", &skill.description);
    sections.push_labeled("执行说明：", &skill.prompt_instructions);
    if skill.include_history && !history.is_empty() {
        sections.push(format!(
            "相关对话回顾：\n{}",
            format_history(history, &role.name)
        ));
    }
    if let Some(input) = user_input {
        sections.push(format!("用户额外说明：{input}"));
    }
    sections.push(SKILL_CLOSING);

    Ok(sections.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Catalog;

    fn bare_role() -> RoleDefinition {
        RoleDefinition {
            id: "plain".to_string(),
            name: "无名氏".to_string(),
            alias: None,
            tagline: None,
            summary: None,
            background: "来自远方。".to_string(),
            style: "平静。".to_string(),
            knowledge_focus: vec![],
            sample_questions: vec![],
            skills: vec![],
        }
    }

    #[test]
    fn conversation_prompt_has_fixed_section_order() {
        let catalog = Catalog::builtin();
        let role = catalog.get_role("harry-potter").unwrap();
        let history = vec![
            ConversationMessage::user("你害怕过吗？"),
            ConversationMessage::assistant("当然。"),
        ];
        let prompt = build_conversation_prompt(role, "  怎样鼓起勇气？ ", &history);

        let sections: Vec<&str> = prompt.split("\n\n").collect();
        assert_eq!(sections.len(), 8);
        assert_eq!(
            sections[0],
            "角色设定：哈利·波特（Harry Potter），霍格沃茨的勇敢守护者"
        );
        assert!(sections[1].starts_with("背景补充："));
        assert!(sections[2].starts_with("表达风格："));
        assert_eq!(
            sections[3],
            "擅长分享的主题：魔法世界的历史与规则、黑魔法防御、友情、选择与勇气的意义"
        );
        assert!(sections[4].starts_with("对话要求："));
        assert_eq!(
            sections[5],
            "最近的对话记录：\n用户: 你害怕过吗？\n哈利·波特: 当然。"
        );
        assert_eq!(sections[6], "用户最新的语音转写内容：怎样鼓起勇气？");
        assert_eq!(sections[7], CONVERSATION_CLOSING);
    }

    #[test]
    fn bare_role_omits_focus_and_history() {
        let prompt = build_conversation_prompt(&bare_role(), "你好", &[]);
        assert!(!prompt.contains("擅长分享的主题"));
        assert!(!prompt.contains("最近的对话记录"));
        assert!(prompt.starts_with("角色设定：无名氏（无名氏）\n\n背景补充：来自远方。"));
        assert!(prompt.contains("表达风格：平静。"));
        assert!(prompt.contains("对话要求："));
        assert!(prompt.contains("用户最新的语音转写内容：你好"));
        assert!(prompt.ends_with(CONVERSATION_CLOSING));
        assert!(!prompt.contains("\n\n\n"));
    }

    #[test]
    fn empty_background_and_style_leave_no_gap() {
        let mut role = bare_role();
        role.background.clear();
        role.style = "   ".to_string();
        let prompt = build_conversation_prompt(&role, "hi", &[]);
        assert!(!prompt.contains("背景补充"));
        assert!(!prompt.contains("表达风格"));
        assert!(prompt.starts_with("角色设定：无名氏（无名氏）\n\n对话要求："));
    }

    #[test]
    fn skill_prompt_requires_input_when_flagged() {
        let catalog = Catalog::builtin();
        let role = catalog.get_role("harry-potter").unwrap();
        let skill = catalog.get_skill("mentor_plan").unwrap();

        for input in [None, Some(""), Some("   \n")] {
            let err = build_skill_prompt(role, skill, input, &[]).unwrap_err();
            assert!(matches!(
                err,
                PromptError::MissingUserInput { ref skill_id } if skill_id == "mentor_plan"
            ));
        }

        let prompt = build_skill_prompt(role, skill, Some("  学好魔咒 "), &[]).unwrap();
        assert!(prompt.contains("用户额外说明：学好魔咒"));
        assert!(prompt.contains("技能目标：结合用户提出的目标"));
        assert!(prompt.contains("执行说明：结合用户提供的目标或困惑"));
        assert!(prompt.ends_with(SKILL_CLOSING));
    }

    #[test]
    fn skill_prompt_history_follows_flag() {
        let catalog = Catalog::builtin();
        let role = catalog.get_role("socrates").unwrap();
        let history = vec![ConversationMessage::user("什么是美德？")];

        let with_history = catalog.get_skill("challenge_question").unwrap();
        let prompt = build_skill_prompt(role, with_history, None, &history).unwrap();
        assert!(prompt.contains("相关对话回顾：\n用户: 什么是美德？"));
        assert!(!prompt.contains("用户额外说明"));

        let without_history = catalog.get_skill("world_briefing").unwrap();
        let prompt = build_skill_prompt(role, without_history, None, &history).unwrap();
        assert!(!prompt.contains("相关对话回顾"));

        let prompt = build_skill_prompt(role, with_history, None, &[]).unwrap();
        assert!(!prompt.contains("相关对话回顾"));
    }

    #[test]
    fn optional_input_is_included_when_given() {
        let catalog = Catalog::builtin();
        let role = catalog.get_role("hua-mulan").unwrap();
        let skill = catalog.get_skill("signature_quote").unwrap();
        let prompt = build_skill_prompt(role, skill, Some("关于坚持"), &[]).unwrap();
        let sections: Vec<&str> = prompt.split("\n\n").collect();
        assert_eq!(sections[sections.len() - 2], "用户额外说明：关于坚持");
        assert_eq!(sections[sections.len() - 1], SKILL_CLOSING);
    }
}
