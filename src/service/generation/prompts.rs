//! Prompt construction for the diagnosis narrative

/// Fixed instruction preamble for every diagnosis request
pub const DIAGNOSIS_PREAMBLE: &str =
    "You are a helpful assistant to perform transformer oil testing to assess the transformer health. \
     Use the following context and chat history to answer the question accurately.";

/// Build the single-shot diagnosis prompt from retrieved context and query.
///
/// The output-format instructions pin the reply to exactly two labeled
/// sections, "Remarks:" then "Preventive Steps:", which the validation
/// step depends on.
pub fn build_diagnosis_prompt(context: &str, query: &str) -> String {
    format!(
        "{DIAGNOSIS_PREAMBLE}\n\n\
         Context:\n{context}\n\n\
         neglect this if it is not relevant\n\
         Question:\n{query}\n\
         Answer: Provide only remarks and preventive steps in this format:\n\
         In remarks definitely mention whether gases levels are satisfactory or not\n\
         Remarks:\n<your remarks>\n\n\
         Preventive Steps:\n<your preventive steps in points>\n\
         Do not include anything else."
    )
}
