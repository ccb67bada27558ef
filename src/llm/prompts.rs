//! Language-specific prompt templates for the map and reduce phases.
//!
//! Lookup is a two-level resolution done per phase: the requested language
//! key (trimmed, lowercased), then [`FALLBACK_LANGUAGE`]. A language that only
//! defines its map prefix therefore gets English reduce prompts while keeping
//! its own map prompt. Resolution never fails.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Language every phase falls back to.
pub const FALLBACK_LANGUAGE: &str = "english";

/// Reduce-phase prompts for one language.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReducePrompts {
    /// System message setting the assistant persona and output language.
    pub system: String,
    /// User message with `{title}`, `{date}` and `{summaries}` slots.
    pub user_template: String,
    /// Rendered into `{title}`/`{date}` when the caller gives none.
    pub to_be_inferred: String,
}

/// Prompt set for one language; either phase may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LanguagePrompts {
    /// Instruction text placed directly before each chunk.
    pub map_prefix: Option<String>,
    pub reduce: Option<ReducePrompts>,
}

/// Messages for the single reduce-phase completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReduceMessages {
    pub system: String,
    pub user: String,
}

/// Immutable table of prompt sets, built once at startup and passed to the
/// summarizer.
#[derive(Debug, Clone)]
pub struct PromptCatalog {
    fallback_map: String,
    fallback_reduce: ReducePrompts,
    languages: HashMap<String, LanguagePrompts>,
}

impl Default for PromptCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PromptCatalog {
    /// Catalog with the built-in English, Portuguese, Spanish, French and
    /// German prompt sets.
    pub fn builtin() -> Self {
        let mut catalog = Self {
            fallback_map: ENGLISH_MAP.to_string(),
            fallback_reduce: reduce(ENGLISH_SYSTEM, ENGLISH_REDUCE, ENGLISH_INFERRED),
            languages: HashMap::new(),
        };

        for (key, map, system, user, inferred) in BUILTIN_LANGUAGES {
            catalog.register(
                key,
                LanguagePrompts {
                    map_prefix: Some(map.to_string()),
                    reduce: Some(reduce(system, user, inferred)),
                },
            );
        }

        catalog
    }

    /// Built-in catalog extended with the prompt sets of a TOML file.
    pub fn with_overrides_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompts file: {}", path.display()))?;

        let mut catalog = Self::builtin();
        catalog
            .merge_toml(&content)
            .with_context(|| format!("Failed to parse prompts file: {}", path.display()))?;
        Ok(catalog)
    }

    /// Merge language tables from TOML. Each `[language]` table may set
    /// `map_prefix` and/or a `[language.reduce]` table; whatever is set
    /// replaces the existing phase for that language.
    pub fn merge_toml(&mut self, content: &str) -> Result<()> {
        let entries: BTreeMap<String, LanguagePrompts> = toml::from_str(content)?;
        for (key, prompts) in entries {
            self.register(&key, prompts);
        }
        Ok(())
    }

    /// Register or update a language. Only the phases present in `prompts`
    /// are replaced. Registering the fallback language updates the fallback.
    pub fn register(&mut self, language: &str, prompts: LanguagePrompts) {
        let key = normalize_key(language);

        if key == FALLBACK_LANGUAGE {
            if let Some(map) = prompts.map_prefix {
                self.fallback_map = map;
            }
            if let Some(reduce) = prompts.reduce {
                self.fallback_reduce = reduce;
            }
            return;
        }

        let entry = self.languages.entry(key).or_default();
        if prompts.map_prefix.is_some() {
            entry.map_prefix = prompts.map_prefix;
        }
        if prompts.reduce.is_some() {
            entry.reduce = prompts.reduce;
        }
    }

    /// Map-phase instruction prefix for `language`.
    pub fn map_prefix(&self, language: &str) -> &str {
        self.languages
            .get(&normalize_key(language))
            .and_then(|p| p.map_prefix.as_deref())
            .unwrap_or(&self.fallback_map)
    }

    /// Reduce-phase prompts for `language`.
    pub fn reduce_prompts(&self, language: &str) -> &ReducePrompts {
        self.languages
            .get(&normalize_key(language))
            .and_then(|p| p.reduce.as_ref())
            .unwrap_or(&self.fallback_reduce)
    }

    /// Full map-phase user message: the prefix followed directly by the chunk.
    pub fn map_prompt(&self, language: &str, chunk: &str) -> String {
        let prefix = self.map_prefix(language);
        let mut prompt = String::with_capacity(prefix.len() + chunk.len());
        prompt.push_str(prefix);
        prompt.push_str(chunk);
        prompt
    }

    /// Reduce-phase messages with title, date and the consolidated chunk
    /// summaries substituted. Missing or blank title/date render the
    /// language's "to be inferred" text.
    pub fn reduce_messages(
        &self,
        language: &str,
        title: Option<&str>,
        date: Option<&str>,
        summaries: &str,
    ) -> ReduceMessages {
        let prompts = self.reduce_prompts(language);
        let title = filled_or(title, &prompts.to_be_inferred);
        let date = filled_or(date, &prompts.to_be_inferred);

        ReduceMessages {
            system: prompts.system.clone(),
            user: render_template(
                &prompts.user_template,
                &[("title", title), ("date", date), ("summaries", summaries)],
            ),
        }
    }

    /// All language keys that resolve to a dedicated prompt for at least one
    /// phase, sorted.
    pub fn languages(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .languages
            .keys()
            .map(String::as_str)
            .chain(std::iter::once(FALLBACK_LANGUAGE))
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }
}

fn normalize_key(language: &str) -> String {
    language.trim().to_lowercase()
}

fn filled_or<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => placeholder,
    }
}

fn reduce(system: &str, user: &str, inferred: &str) -> ReducePrompts {
    ReducePrompts {
        system: system.to_string(),
        user_template: user.to_string(),
        to_be_inferred: inferred.to_string(),
    }
}

/// Replace `{name}` slots in one left-to-right pass. Substituted values are
/// never rescanned, and unknown `{...}` sequences are kept verbatim.
fn render_template(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let slot = after.find('}').and_then(|close| {
            let name = &after[..close];
            slots
                .iter()
                .find(|(slot, _)| *slot == name)
                .map(|(_, value)| (*value, close))
        });

        match slot {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

const ENGLISH_MAP: &str = "Summarize the following excerpt of a meeting transcript in English. \
Keep the participants mentioned, the topics discussed, any decisions made, action items \
(with owners and deadlines when stated) and conclusions. Do not invent information.\n\n\
Transcript excerpt:\n";

const ENGLISH_SYSTEM: &str =
    "You are an assistant specialized in creating precise and well-formatted meeting minutes in English.";

const ENGLISH_REDUCE: &str = "Based on the partial summaries of a meeting below, \
generate a single formal meeting minutes document in English with these sections:
1. Title: {title}
2. Date: {date}
3. Participants identified in the meeting
4. Meeting agenda
5. Main points discussed
6. Decisions made
7. Actions to be taken (with owners and deadlines when stated)
8. Conclusions

If the title or date says it is to be inferred, infer it from the content when possible.

Partial summaries:
{summaries}";

const ENGLISH_INFERRED: &str = "To be inferred from the content";

const PORTUGUESE_MAP: &str = "Resuma o seguinte trecho da transcrição de uma reunião em Português. \
Mantenha os participantes mencionados, os assuntos discutidos, as decisões tomadas, as ações \
(com responsáveis e prazos quando citados) e as conclusões. Não invente informações.\n\n\
Trecho da transcrição:\n";

const PORTUGUESE_SYSTEM: &str =
    "Você é um assistente especializado em criar atas de reunião precisas e bem formatadas em Português.";

const PORTUGUESE_REDUCE: &str = "Com base nos resumos parciais de uma reunião abaixo, \
gere uma única ata de reunião formal em Português com estas seções:
1. Título: {title}
2. Data: {date}
3. Participantes identificados na reunião
4. Pauta da reunião
5. Principais pontos discutidos
6. Decisões tomadas
7. Ações a serem realizadas (com responsáveis e prazos quando citados)
8. Conclusões

Se o título ou a data indicar que deve ser inferido, deduza-o do conteúdo quando possível.

Resumos parciais:
{summaries}";

const PORTUGUESE_INFERRED: &str = "A ser inferido do conteúdo";

const SPANISH_MAP: &str = "Resuma el siguiente fragmento de la transcripción de una reunión en Español. \
Conserve los participantes mencionados, los temas tratados, las decisiones tomadas, las acciones \
(con responsables y plazos cuando se indiquen) y las conclusiones. No invente información.\n\n\
Fragmento de la transcripción:\n";

const SPANISH_SYSTEM: &str =
    "Usted es un asistente especializado en crear actas de reunión precisas y bien formateadas en Español.";

const SPANISH_REDUCE: &str = "Con base en los resúmenes parciales de una reunión a continuación, \
genere una única acta de reunión formal en Español con estas secciones:
1. Título: {title}
2. Fecha: {date}
3. Participantes identificados en la reunión
4. Agenda de la reunión
5. Puntos principales discutidos
6. Decisiones tomadas
7. Acciones a realizar (con responsables y plazos cuando se indiquen)
8. Conclusiones

Si el título o la fecha indica que debe inferirse, dedúzcalo del contenido cuando sea posible.

Resúmenes parciales:
{summaries}";

const SPANISH_INFERRED: &str = "A inferir del contenido";

const FRENCH_MAP: &str = "Résumez l'extrait suivant de la transcription d'une réunion en Français. \
Conservez les participants mentionnés, les sujets abordés, les décisions prises, les actions \
(avec responsables et échéances lorsqu'elles sont indiquées) et les conclusions. N'inventez rien.\n\n\
Extrait de la transcription :\n";

const FRENCH_SYSTEM: &str =
    "Vous êtes un assistant spécialisé dans la rédaction de comptes-rendus de réunion précis et bien formatés en Français.";

const FRENCH_REDUCE: &str = "À partir des résumés partiels d'une réunion ci-dessous, \
générez un compte-rendu formel unique de la réunion en Français contenant ces sections :
1. Titre : {title}
2. Date : {date}
3. Participants identifiés dans la réunion
4. Ordre du jour de la réunion
5. Principaux points discutés
6. Décisions prises
7. Actions à entreprendre (avec responsables et échéances lorsqu'elles sont indiquées)
8. Conclusions

Si le titre ou la date indique qu'il faut le déduire, déduisez-le du contenu lorsque c'est possible.

Résumés partiels :
{summaries}";

const FRENCH_INFERRED: &str = "À déduire du contenu";

const GERMAN_MAP: &str = "Fassen Sie den folgenden Auszug aus dem Transkript einer Sitzung auf Deutsch zusammen. \
Behalten Sie die genannten Teilnehmer, die besprochenen Themen, getroffene Entscheidungen, Maßnahmen \
(mit Verantwortlichen und Fristen, sofern genannt) und Schlussfolgerungen bei. Erfinden Sie nichts.\n\n\
Transkriptauszug:\n";

const GERMAN_SYSTEM: &str =
    "Sie sind ein Assistent, der auf präzise und gut formatierte Sitzungsprotokolle auf Deutsch spezialisiert ist.";

const GERMAN_REDUCE: &str = "Erstellen Sie auf Grundlage der untenstehenden Teilzusammenfassungen einer Sitzung \
ein einziges formelles Sitzungsprotokoll auf Deutsch mit diesen Abschnitten:
1. Titel: {title}
2. Datum: {date}
3. In der Sitzung identifizierte Teilnehmer
4. Tagesordnung der Sitzung
5. Wichtigste besprochene Punkte
6. Getroffene Entscheidungen
7. Zu ergreifende Maßnahmen (mit Verantwortlichen und Fristen, sofern genannt)
8. Schlussfolgerungen

Wenn Titel oder Datum abzuleiten sind, leiten Sie sie nach Möglichkeit aus dem Inhalt ab.

Teilzusammenfassungen:
{summaries}";

const GERMAN_INFERRED: &str = "Aus dem Inhalt abzuleiten";

/// (key, map prefix, reduce system, reduce user template, to-be-inferred)
const BUILTIN_LANGUAGES: [(&str, &str, &str, &str, &str); 4] = [
    (
        "portuguese",
        PORTUGUESE_MAP,
        PORTUGUESE_SYSTEM,
        PORTUGUESE_REDUCE,
        PORTUGUESE_INFERRED,
    ),
    ("spanish", SPANISH_MAP, SPANISH_SYSTEM, SPANISH_REDUCE, SPANISH_INFERRED),
    ("french", FRENCH_MAP, FRENCH_SYSTEM, FRENCH_REDUCE, FRENCH_INFERRED),
    ("german", GERMAN_MAP, GERMAN_SYSTEM, GERMAN_REDUCE, GERMAN_INFERRED),
];
