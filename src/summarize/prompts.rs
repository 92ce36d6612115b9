pub fn summarize_prompt(text: &str) -> String {
    format!("Write a concise summary of the following:\n\n\n\"{text}\"\n\n\nCONCISE SUMMARY:")
}

pub fn map_prompt(section: &str) -> String {
    format!(
        "Write a concise summary of the following excerpt from a research paper. \
         Keep concrete details such as methods, datasets and numbers.\n\n\n\
         \"{section}\"\n\n\nCONCISE SUMMARY:"
    )
}

pub fn combine_prompt(summaries: &str) -> String {
    format!(
        "The following are summaries of consecutive parts of one research paper. \
         Combine them into a single concise summary of the whole paper.\n\n\n\
         \"{summaries}\"\n\n\nCONCISE SUMMARY:"
    )
}
