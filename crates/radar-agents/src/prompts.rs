//! Prompt templates and the message envelopes around analysis results.
//!
//! Prompts carry untrusted page text; they are sent as plain strings and
//! never rendered. Envelopes are Telegram HTML.

use radar_common::ResolvedContent;

pub const SUMMARY_HEADER: &str = "🧠 <b>✨ AI Radar — Análisis Automático</b>";
pub const DEEPEN_INVITATION: &str =
    "💬 ¿Sobre cuál quieres profundizar? Responde con «profundiza sobre la N» o pregúntame cualquier cosa.";

pub fn summary_prompt(item: &ResolvedContent) -> String {
    format!(
        "Eres un analista de inteligencia en IA, deepfakes y ciberseguridad.\n\
         Analiza este contenido.\n\
         Título: {title}\n\
         Fuente: {url}\n\
         Contenido:\n{body}\n\n\
         Responde en este formato exacto:\n\
         - Qué es: [1-2 líneas]\n\
         - Por qué importa: [1-2 líneas]\n\
         - Riesgos o aplicaciones: [1-2 líneas]\n\
         - Impacto: [número entero del 1 al 10]",
        title = item.title,
        url = item.url,
        body = item.body,
    )
}

pub fn deep_dive_prompt(item: &ResolvedContent) -> String {
    format!(
        "Eres un analista senior de inteligencia en IA, deepfakes y ciberseguridad.\n\
         Haz un análisis detallado de este contenido.\n\
         Título: {title}\n\
         Fuente: {url}\n\
         Contenido:\n{body}\n\n\
         Estructura tu respuesta en cuatro secciones:\n\
         1. Explicación técnica\n\
         2. Aplicaciones prácticas\n\
         3. Riesgos o ventajas\n\
         4. Recomendaciones de mitigación",
        title = item.title,
        url = item.url,
        body = item.body,
    )
}

pub fn question_prompt(question: &str) -> String {
    format!("Eres un experto en IA y ciberseguridad. Responde: {question}")
}

/// Wrap numbered per-item analyses in the batch envelope.
pub fn batch_envelope(ranking: &str, invite_deepen: bool) -> String {
    let mut out = format!("{SUMMARY_HEADER}\n\n{ranking}");
    if invite_deepen {
        out.push_str("\n\n");
        out.push_str(DEEPEN_INVITATION);
    }
    out
}

pub fn deep_dive_envelope(index: usize, analysis: &str) -> String {
    format!("🔍 <b>Análisis profundo — elemento {index}</b>\n\n{analysis}")
}

/// Reply for a deepen command whose index is not in `1..=available`.
/// `index` is `None` when the operator typed a number too large to represent.
pub fn out_of_range_notice(index: Option<usize>, available: usize) -> String {
    match (available, index) {
        (0, _) => "⚠️ No hay enlaces recientes. Envía un mensaje con enlaces primero.".to_string(),
        (n, Some(index)) => {
            format!("⚠️ Número fuera de rango ({index}). Elige un número entre 1 y {n}.")
        }
        (n, None) => format!("⚠️ Número fuera de rango. Elige un número entre 1 y {n}."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> ResolvedContent {
        ResolvedContent::new("https://example.com/a", "Enlace: https://example.com/a", "body text")
    }

    #[test]
    fn summary_prompt_carries_content_and_structure() {
        let prompt = summary_prompt(&item());
        assert!(prompt.contains("https://example.com/a"));
        assert!(prompt.contains("body text"));
        assert!(prompt.contains("Qué es"));
        assert!(prompt.contains("Por qué importa"));
        assert!(prompt.contains("Riesgos o aplicaciones"));
        assert!(prompt.contains("del 1 al 10"));
    }

    #[test]
    fn deep_dive_prompt_has_four_sections() {
        let prompt = deep_dive_prompt(&item());
        for section in [
            "Explicación técnica",
            "Aplicaciones prácticas",
            "Riesgos o ventajas",
            "Recomendaciones de mitigación",
        ] {
            assert!(prompt.contains(section), "missing {section}");
        }
    }

    #[test]
    fn invitation_is_optional() {
        assert!(batch_envelope("1. x", true).ends_with(DEEPEN_INVITATION));
        let plain = batch_envelope("1. x", false);
        assert!(plain.starts_with(SUMMARY_HEADER));
        assert!(!plain.contains("profundizar"));
    }

    #[test]
    fn out_of_range_mentions_bounds() {
        assert!(out_of_range_notice(Some(3), 2).contains("(3)"));
        assert!(out_of_range_notice(Some(3), 2).contains("entre 1 y 2"));
        assert!(out_of_range_notice(Some(1), 0).contains("No hay enlaces"));
        assert_eq!(
            out_of_range_notice(None, 2),
            "⚠️ Número fuera de rango. Elige un número entre 1 y 2."
        );
    }
}
