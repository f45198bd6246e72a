//! Prompt construction for story generation

/// Build the system instruction for one generation request
///
/// Combines the flash-fiction directive, the theme's style instruction, the
/// JSON output requirement and the output language.
///
/// # Examples
///
/// ```
/// use microfavola::generation::prompt::system_instruction;
///
/// let prompt = system_instruction("Linguaggio lirico, delicato e sognante.", "italiano");
/// assert!(prompt.contains("max 100 parole"));
/// assert!(prompt.contains("Linguaggio lirico"));
/// assert!(prompt.contains("lingua italiano"));
/// ```
pub fn system_instruction(style_instruction: &str, language: &str) -> String {
    format!(
        "Sei un maestro di micro-narrativa e flash fiction.\n\
         Il tuo compito è trasformare le parole dell'utente in una mini-storia brevissima (max 100 parole).\n\
         REGOLE CRITICHE:\n\
         1. Ogni storia DEVE avere un finale a sorpresa, un colpo di scena o un'ironia finale che ribalta il senso.\n\
         2. Rispetta lo stile richiesto: {style}\n\
         3. La risposta deve essere in formato JSON valido, con i campi \"title\", \"content\" e \"twist\" in quest'ordine.\n\
         4. Usa la lingua {language}.",
        style = style_instruction.trim(),
        language = language.trim(),
    )
}

/// Build the user content for one generation request
pub fn user_content(input_text: &str, theme_id: &str) -> String {
    format!(
        "Parole chiave: {}. Tema: {}. Genera la storia.",
        input_text.trim(),
        theme_id
    )
}
