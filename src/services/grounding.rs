use std::fmt::Write;

use crate::models::Movie;

/// Placeholder replaced by the movie title inside template sentences
const TITLE_PLACEHOLDER: &str = "{title}";

/// One line the detail expansion must produce, e.g. `<p><b>Director:</b> ...</p>`
#[derive(Debug, Clone, PartialEq)]
pub struct DetailField {
    pub label: String,
    pub guidance: String,
}

impl DetailField {
    fn new(label: &str, guidance: &str) -> Self {
        Self {
            label: label.to_string(),
            guidance: guidance.to_string(),
        }
    }
}

/// Wording and markup rules shared by both prompt shapes
///
/// Holds every literal sentence, so the wording can change without touching
/// the builders.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    /// Tags the expansion may use, without angle brackets
    pub allowed_tags: Vec<String>,
    /// Fields requested from the model; the rating line is added separately
    pub detail_fields: Vec<DetailField>,
    /// Literal written for anything the model cannot determine
    pub not_available: String,
    /// Reply to off-topic questions; `{title}` is substituted
    pub refusal: String,
    /// Reply when the model has nothing grounded to say
    pub no_information: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            allowed_tags: vec!["h3".to_string(), "p".to_string(), "b".to_string()],
            detail_fields: vec![
                DetailField::new("Stars", "comma-separated names of the main cast"),
                DetailField::new("Director", "comma-separated director names"),
                DetailField::new("Writers", "comma-separated writer names"),
                DetailField::new("Genres", "comma-separated genres, such as Action, Adventure, Sci-Fi"),
                DetailField::new("Runtime", "total running time, such as 2h 15m"),
                DetailField::new("Production", "production companies, such as Marvel Studios, Paramount Pictures"),
                DetailField::new("Awards", "notable awards, such as 3 Oscars, 5 Golden Globe Nominations"),
                DetailField::new("Release Country", "country of first release, such as USA"),
            ],
            not_available: "Not Available".to_string(),
            refusal: "I'm here to assist you with information about {title}. Please ask me anything related to this movie.".to_string(),
            no_information: "Sorry, unfortunately, I don't have any information on that.".to_string(),
        }
    }
}

impl PromptTemplate {
    fn tag_list(&self) -> String {
        self.allowed_tags
            .iter()
            .map(|tag| format!("<{}>", tag))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn refusal_for(&self, title: &str) -> String {
        self.refusal.replace(TITLE_PLACEHOLDER, title)
    }

    /// Rating literal the model must copy verbatim
    fn rating_literal(&self, movie: &Movie) -> String {
        movie
            .rating_label()
            .unwrap_or_else(|| self.not_available.clone())
    }

    fn write_known_details(&self, out: &mut String, movie: &Movie) {
        let release = movie.release_date_or(&self.not_available);
        let language = movie.language_or(&self.not_available);
        let overview = movie.overview_or(&self.not_available);

        let _ = writeln!(out, "- Movie Name: {}", movie.title);
        let _ = writeln!(out, "- Rating: {}", self.rating_literal(movie));
        let _ = writeln!(out, "- Release Date: {}", release);
        let _ = writeln!(out, "- Language: {}", language);
        let _ = writeln!(out, "- Overview: {}", overview);
    }
}

/// Prompt asking the model to expand a movie into an HTML detail fragment
pub fn detail_expansion_prompt(movie: &Movie, template: &PromptTemplate) -> String {
    let na = &template.not_available;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "You are a movie expert. Based on the following movie details, generate an HTML-formatted description using only {} tags. Do not include the movie title in your response, as it is already displayed.",
        template.tag_list()
    );
    out.push('\n');
    out.push_str("Movie details, for your reference only:\n");
    template.write_known_details(&mut out, movie);
    out.push('\n');
    out.push_str("Instructions:\n");

    for field in &template.detail_fields {
        let _ = writeln!(
            out,
            "- Provide a <p><b>{}:</b> ...</p> line with the {} of the actual movie, or '{}' if unknown.",
            field.label, field.guidance, na
        );
    }
    let _ = writeln!(
        out,
        "- Provide the line <p><b>Rating:</b> {}</p> exactly as written, keeping one digit after the decimal point.",
        template.rating_literal(movie)
    );
    out.push_str("- Include a <h3><b>Summary</b></h3> heading followed by a <p> with a detailed summary of the movie.\n");
    let _ = writeln!(
        out,
        "- Write '{}' for any detail you cannot determine. Do not guess or invent information.",
        na
    );
    out.push_str("- Do not wrap the output in <html>, <head> or <body> tags; it is inserted directly into an existing page.\n");

    out
}

/// Persona prefix grounding every follow-up question to one movie
///
/// Rebuilt from scratch whenever the selected movie changes; never edited.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaContext {
    movie_id: u64,
    text: String,
}

impl PersonaContext {
    pub fn build(movie: &Movie, template: &PromptTemplate) -> Self {
        let title = movie.title.as_str();
        let mut text = String::new();

        let _ = writeln!(
            text,
            "You are a movie information assistant specializing in the film {}.",
            title
        );
        text.push_str("Known details:\n");
        template.write_known_details(&mut text, movie);
        text.push_str("Guidelines:\n");
        let _ = writeln!(
            text,
            "1. Primary Focus: Provide detailed and accurate information solely about the movie {}.",
            title
        );
        let _ = writeln!(
            text,
            "2. Handling Other Inquiries: If a user asks about any other movie or unrelated topic, respond with: \"{}\"",
            template.refusal_for(title)
        );
        let _ = writeln!(
            text,
            "3. General Questions: For general questions that could pertain to {} (e.g., \"Is it good?\", \"Tell me about this\"), interpret them in the context of {} and provide relevant information.",
            title, title
        );
        let _ = writeln!(
            text,
            "4. Insufficient Information: If you lack accurate information to answer a question about {}, respond with: \"{}\"",
            title, template.no_information
        );
        let _ = write!(
            text,
            "5. Avoiding Irrelevant Topics: Do not discuss topics outside the scope of {}.",
            title
        );

        Self {
            movie_id: movie.id,
            text,
        }
    }

    pub fn movie_id(&self) -> u64 {
        self.movie_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Full outbound prompt for one user question
    pub fn compose(&self, question: &str) -> String {
        format!("{}\n\nUser question: {}", self.text, question.trim())
    }
}
