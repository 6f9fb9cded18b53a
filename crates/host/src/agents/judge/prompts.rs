// crates/host/src/agents/judge/prompts.rs

//! Judge prompt template.

const TEMPLATE: &str = "You are evaluating one turn of an assistant that can call functions.\n\
     The available functions are generate_joke, get_current_weather(location, unit) \
     and calculate_age(birth_year).\n\n\
     [Question]: {question}\n\
     [Function Called]: {tool_call}\n\
     [Output]: {output}\n\n\
     Decide whether the assistant picked the right function (or correctly picked none), \
     passed sensible arguments, and whether the output answers the question.\n\
     Write a short explanation first. Then, on the last line, write exactly \
     \"LABEL: VALID\" or \"LABEL: INVALID\".";

/// Fill the judge template for one span.
pub fn build_judge_prompt(question: &str, tool_call: Option<(&str, &str)>, output: &str) -> String {
    let call = match tool_call {
        Some((name, args)) => format!("{name}({args})"),
        None => "none".to_string(),
    };
    TEMPLATE
        .replace("{question}", question)
        .replace("{tool_call}", &call)
        .replace("{output}", output)
}
