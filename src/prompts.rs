//! Prompt construction for the design-to-code generation call.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the interpretation protocol or a
//!    format contract requires editing exactly one place.
//! 2. **Testability** — unit tests can inspect prompts directly without
//!    calling a real model, so prompt regressions are easy to catch.
//!
//! Callers can override the system instruction via
//! [`crate::config::GenerationConfig::system_prompt`]; the builders here are
//! used when no override is provided.

use crate::config::OutputFormat;

/// The 4-stage interpretation protocol the model must follow before coding.
const VISION_PROTOCOL: &str = r#"You are an expert frontend engineer who converts UI designs into code using a strict 4-stage vision analysis protocol.

YOUR PROCESS (INTERNAL ANALYSIS):

1. SEGMENTATION: The input images are VERTICAL SLICES of a single
   long-scrolling page (or multiple pages of one design). Stitch them
   mentally into one continuous layout. Do not treat them as separate
   screens unless they are clearly distinct pages.
2. OBJECT DETECTION: Identify every UI element — buttons, inputs, cards,
   icons, navigation, imagery.
3. SPATIAL CALCULATION: Measure pixel distances between elements across the
   slices and translate them to relative spacing classes (e.g. a ~40px gap
   becomes a framework spacing utility). Maintain the exact vertical rhythm
   of the original design.
4. TRANSCRIPTION: Transcribe all text exactly as it appears and sample
   colors exactly (use specific hex codes when framework palettes don't
   match).

CODING RULES:

- NO TRUNCATION: generate code for the ENTIRE LENGTH of the design, from
  the top slice to the bottom slice, as one seamless scrolling page.
- For detected image objects use "https://picsum.photos/800/600" or similar
  placeholders."#;

/// Format-specific code-shape contract appended to the protocol.
fn format_contract(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::React => {
            r#"OUTPUT FORMAT: a SINGLE-FILE React functional component.
- Export default.
- Use Tailwind CSS utility classes for all styling.
- Use lucide-react icons."#
        }
        OutputFormat::Bootstrap => {
            r#"OUTPUT FORMAT: a SINGLE self-contained HTML file.
- Load Bootstrap 5.3 from its public CDN (<link href="..." rel="stylesheet">).
- Use Bootstrap utility classes (d-flex, mb-3, p-4, …) and components
  (Card, Navbar, Grid) wherever possible.
- If utilities aren't enough, add a <style> block with custom CSS for
  pixel-perfect results."#
        }
    }
}

/// Build the system instruction for the given output format.
pub fn system_instruction(format: OutputFormat) -> String {
    format!("{VISION_PROTOCOL}\n\n{}", format_contract(format))
}

/// Build the user prompt accompanying the slice images.
pub fn user_prompt(format: OutputFormat, slice_count: usize) -> String {
    let target = match format {
        OutputFormat::React => "React + Tailwind code",
        OutputFormat::Bootstrap => "HTML + Bootstrap 5 code",
    };
    format!(
        "Analyze the uploaded design slices (total {slice_count} parts) using the \
         4-stage protocol, then generate the {target} that reproduces the FULL \
         design pixel-perfectly. The design is split into multiple vertical parts — \
         convert the ENTIRE LENGTH, do not stop halfway.\n\n\
         Return ONLY the code string. No markdown fences. No explanations."
    )
}
