//! Prompt templates, canned replies and end-intent detection for screening.

use super::model::CandidateRecord;
use super::state::Stage;

/// Phrases that signal the candidate wants to stop.
const ENDING_KEYWORDS: [&str; 11] = [
    "bye",
    "goodbye",
    "exit",
    "quit",
    "end",
    "stop",
    "that's all",
    "thats all",
    "no more",
    "done",
    "finish",
];

/// Longest message (in whitespace tokens) eligible for substring matching.
const SHORT_MESSAGE_TOKENS: usize = 3;

/// Shown when question generation degrades.
pub const QUESTIONS_PENDING_REPLY: &str = "I'll prepare some questions for you shortly.";

/// Shown when the generation branch is reached without a tech stack.
pub const ASK_FOR_TECH_STACK_REPLY: &str = "Could you list your tech stack?";

/// Reply to anything but an ending phrase once the screening is over.
pub const ALREADY_CONCLUDED_REPLY: &str = "This screening has already concluded. \
Our TalentScout team will review your information and be in touch. \
Start a new chat if you would like to begin another screening.";

/// Whether the candidate is asking to end the conversation.
///
/// The lower-cased, trimmed message matches when it equals an ending phrase
/// outright, or when it is at most three tokens long and contains one.
pub fn detect_conversation_ending(message: &str) -> bool {
    let normalized = message.trim().to_lowercase();
    let short = normalized.split_whitespace().count() <= SHORT_MESSAGE_TOKENS;

    ENDING_KEYWORDS
        .iter()
        .any(|kw| normalized == *kw || (short && normalized.contains(kw)))
}

pub fn greeting_prompt() -> &'static str {
    "\
You are an AI Hiring Assistant for TalentScout, a recruitment agency specializing in technology placements.

Your objective is to conduct an initial candidate screening interview. You will:
1. Collect essential candidate information (name, contact details, experience, desired position, location, and technical skills)
2. Generate relevant technical questions based on their declared tech stack
3. Maintain a professional, conversational tone throughout the interaction

Start by greeting the candidate professionally and clearly explaining:
- That you are TalentScout's AI Hiring Assistant
- Your purpose is to conduct an initial screening interview
- You will be collecting their information and asking technical questions
- The process will take approximately 5-10 minutes

Keep your greeting professional, clear, and concise (3-4 sentences). Do not use emojis."
}

/// Prompt asking the model to pull candidate fields out of the latest message.
pub fn extraction_prompt(user_message: &str, history: &str) -> String {
    format!(
        "\
You are an AI assistant helping to extract candidate information from a conversation.

CONVERSATION HISTORY:
{history}

LATEST USER MESSAGE:
{user_message}

Extract any of the following information that is present in the user's message:
- full_name: The candidate's full name
- email: Email address
- phone: Phone number
- years_of_experience: Number of years of professional experience (as a number)
- desired_position: Job position(s) they're interested in
- current_location: City, state, or country where they're located
- tech_stack: List of technologies, programming languages, frameworks, databases, tools they know

Return ONLY a JSON object with the fields that were found. Use null for fields not mentioned.
If the user is just greeting or asking questions, return an empty object {{}}.

Example output format:
{{
    \"full_name\": \"John Doe\",
    \"email\": \"john@example.com\",
    \"phone\": \"+1234567890\",
    \"years_of_experience\": 5,
    \"desired_position\": \"Senior Software Engineer\",
    \"current_location\": \"San Francisco, CA\",
    \"tech_stack\": [\"Python\", \"Django\", \"React\", \"PostgreSQL\", \"AWS\"]
}}

JSON OUTPUT:"
    )
}

/// Prompt asking for 3-5 questions per declared technology.
pub fn tech_questions_prompt(tech_stack: &[String]) -> String {
    let tech_list = tech_stack.join(", ");
    format!(
        "\
You are a technical interviewer for TalentScout. Generate relevant technical questions to assess a candidate's proficiency.

CANDIDATE'S TECH STACK: {tech_list}

For each technology in the tech stack, generate 3-5 technical questions that:
- Range from intermediate to advanced difficulty
- Cover practical, real-world scenarios
- Test both theoretical knowledge and practical application
- Are specific to that technology (not generic programming questions)

Return a JSON object where each key is a technology and the value is a list of questions.

Example format:
{{
    \"Python\": [
        \"How does Python's Global Interpreter Lock (GIL) affect multi-threaded applications?\",
        \"Describe how you would implement a decorator that caches function results.\"
    ],
    \"Django\": [
        \"How would you optimize a Django application that's experiencing slow database queries?\",
        \"Describe the difference between Django's select_related and prefetch_related.\"
    ]
}}

Generate questions for: {tech_list}

JSON OUTPUT:"
    )
}

/// Contextual reply prompt, with guidance tailored to the stage.
pub fn response_prompt(
    user_message: &str,
    history: &str,
    candidate: &CandidateRecord,
    stage: Stage,
) -> String {
    let missing = candidate.missing_fields();
    let missing_text = if missing.is_empty() {
        "None - all information collected".to_string()
    } else {
        missing.join(", ")
    };

    let mut prompt = format!(
        "\
You are an AI Hiring Assistant for TalentScout.

CONVERSATION STAGE: {stage}

CONVERSATION HISTORY:
{history}

LATEST USER MESSAGE:
{user_message}

COLLECTED CANDIDATE INFORMATION:
{collected}

MISSING INFORMATION: {missing_text}
",
        collected = candidate.to_display_section(),
    );

    let guidance = match stage {
        Stage::Greeting => "
The candidate has just started the conversation. Greet them warmly and explain that you'll be \
collecting some information for the initial screening process. Keep it brief and friendly."
            .to_string(),
        Stage::InfoGathering if !missing.is_empty() => format!(
            "
You are collecting candidate information. You still need: {}.

Ask for the missing information in a natural, conversational way. Don't ask for everything at once - \
ask for 1-2 items at a time.
Be friendly and professional. If the user provided some information, acknowledge it before asking for more.",
            missing.join(", ")
        ),
        Stage::InfoGathering => "
All candidate information has been collected! Thank them and let them know you'll be asking some \
technical questions about their tech stack."
            .to_string(),
        Stage::TechQuestions => "
You have the candidate's tech stack and have generated technical questions.
Engage with their answers, provide brief feedback if appropriate, and ask follow-up questions naturally.
Maintain a professional but friendly tone."
            .to_string(),
        Stage::Conclusion => "
The conversation is concluding. Thank the candidate for their time, summarize what was discussed,
and explain that the TalentScout team will review their information and reach out within 3-5 business days.
Be warm and professional."
            .to_string(),
    };
    prompt.push_str(&guidance);

    prompt.push_str(
        "

Generate a natural, conversational response. Keep it concise (2-4 sentences unless more detail is needed).
Do not ask for information that has already been provided.

RESPONSE:",
    );
    prompt
}

/// Redirect an off-topic message back to the screening.
pub fn fallback_prompt(user_message: &str) -> String {
    format!(
        "\
You are an AI Hiring Assistant for TalentScout. The candidate said something unexpected or off-topic.

USER MESSAGE: {user_message}

Politely redirect the conversation back to the hiring process. Remind them that you're here to help with their job application.
If they seem confused, briefly re-explain what information you need.
If they're asking about the company or process, provide a brief, helpful answer and then redirect.

Keep your response professional, helpful, and brief (2-3 sentences).

RESPONSE:"
    )
}

/// Fixed closing message, addressed by name when we have one.
pub fn conclusion_message(candidate_name: Option<&str>) -> String {
    let name = candidate_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("there");

    format!(
        "\
Thank you for your time, {name}.

I have collected all the necessary information for your initial screening. Our TalentScout \
recruitment team will carefully review your profile and technical responses.

You can expect to hear back from us within 3-5 business days via the email address you provided. \
If your profile matches our current openings, we will reach out to schedule a detailed interview.

Best of luck with your job search."
    )
}

/// Assistant reply announcing a freshly generated question set.
pub fn questions_ready_message(tech_stack: &[String], questions_display: &str) -> String {
    format!(
        "I've prepared some technical questions for your skills in {}.\n\n{questions_display}",
        tech_stack.join(", ")
    )
}
