//! Style guide and topic catalog handed to the prompt composer.

use rand::seq::SliceRandom;

/// A named theme and the art direction that goes with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topic {
    pub name: &'static str,
    pub instructions: &'static str,
}

impl Topic {
    /// Directory-safe form of the topic name.
    pub fn slug(&self) -> String {
        topic_slug(self.name)
    }
}

/// Lowercase the name and replace spaces with underscores.
pub fn topic_slug(name: &str) -> String {
    name.replace(' ', "_").to_lowercase()
}

pub const GUIDE: &str = r#"## Guide for Composing Image Prompts

Cover the following components so the image model receives clear, detailed direction:

1. Topic: the main subject or scene. Name characters, objects, setting and action, and describe them vividly.
2. Material / medium: digital painting, oil, watercolor, 3D render, photography. This fixes texture and finish.
3. Style: fantasy, cyberpunk, minimalism, surrealism. Styles may be combined for unusual effects.
4. Artist influence: artists or studios whose look should be emulated.
5. Platform influence: ArtStation, DeviantArt or Behance as a quality benchmark.
6. Sharpness and detail: "highly detailed", "sharp focus", "intricate textures".
7. Extra details: atmosphere such as glow, motion, fog, particles.
8. Shade and color: palette and tone, which carry the emotional register.
9. Lighting and brightness: soft ambient light, hard shadows, neon, backlight.

Tips:
- Be specific about the main elements and how they relate within the frame.
- Prefer concrete, sensory adjectives over vague ones.
- Use artistic vocabulary: composition, lighting setups, color theory.
- Leave little room for misinterpretation.
- Cut words that do not change the picture.
"#;

pub const TOPICS: &[Topic] = &[
    Topic {
        name: "Fantasy and Sci-Fi Art",
        instructions: r#"Instructions:
- Subjects: mythical creatures (dragons, griffins), futuristic characters (cyborgs, space explorers), heroic figures (knights, space marines), epic landscapes (enchanted forests, alien planets, dystopian cities).
- Scenes: battles between creatures and machines, explorers uncovering ruins on alien worlds, mages casting spells in neon cityscapes. Favor dynamic poses.
- Medium: detailed digital painting, realistic 3D render, classic oil, game concept art. Emphasize metallic armor, organic hide, ethereal magical glow.
- Style: high fantasy, cyberpunk, steampunk, space opera, or a deliberate blend of fantasy and technology.
- Artist influence: Frank Frazetta, H.R. Giger, Syd Mead, Yoshitaka Amano.
- Detail: sharp focus, intricate armor and weaponry, realistic material textures.
- Atmosphere: mist, rain, lightning, light rays, nebulae, planetary rings.
- Color: vibrant contrast for adventure, dark tones for menace, warm hues for heroism.
- Lighting: dramatic backlight, divine glow, neon.
- Avoid: anachronisms, blur, grain, low-resolution textures.
"#,
    },
    Topic {
        name: "Minimalist and Abstract Art",
        instructions: r#"Instructions:
- Subjects: simple geometric shapes, a single isolated object, flowing lines, negative space used as a subject.
- Composition: generous empty space, strong balance, one clear focal point, rule of thirds or strict symmetry.
- Medium: flat vector illustration, clean 3D render, paper cut-out, ink on textured paper.
- Style: Bauhaus, Swiss design, color-field painting, Japanese ma.
- Artist influence: Piet Mondrian, Kazimir Malevich, Mark Rothko, Agnes Martin.
- Detail: crisp edges, smooth gradients, precise alignment.
- Color: limited palettes of two or three hues, monochrome, or muted pastels with one accent.
- Lighting: soft, even light with subtle shadows.
- Avoid: clutter, busy textures, text, excess ornament.
"#,
    },
    Topic {
        name: "Surreal and Dreamlike Imagery",
        instructions: r#"Instructions:
- Subjects: impossible architecture, floating islands, melting or morphing objects, figures made of sky or water, oversized everyday items.
- Scenes: dream logic, familiar places with one rule broken, juxtapositions of scale.
- Medium: hyper-real digital painting, photo manipulation, oil on canvas.
- Style: classic surrealism, magical realism, dark fairy tale.
- Artist influence: Salvador Dalí, René Magritte, Remedios Varo, Zdzisław Beksiński.
- Detail: photographic precision applied to impossible things.
- Atmosphere: haze, long shadows, still water, drifting particles.
- Color: soft dusk gradients, pale golds, or unsettling saturated accents.
- Lighting: low sun, glow with no visible source.
- Avoid: cartoon rendering, clutter that hides the central idea.
"#,
    },
    Topic {
        name: "Space and Astronomy Art",
        instructions: r#"Instructions:
- Subjects: nebulae, galaxies, ringed planets, black holes with accretion disks, comets, astronauts, orbital stations.
- Scenes: a planet rising over an alien horizon, a lone explorer before a vast nebula, ships passing a gas giant.
- Medium: photoreal space render, matte painting, retro-futurist illustration.
- Style: scientifically grounded realism or classic 1970s space art.
- Artist influence: Chesley Bonestell, John Harris, Robert McCall.
- Detail: dense starfields, fine dust lanes, crisp planetary surface texture.
- Atmosphere: lens flare, god rays through dust, aurora on the limb of a planet.
- Color: deep blacks with luminous blues, magentas and golds.
- Lighting: a single hard star as key light, rim light on hulls and helmets.
- Avoid: cartoon stars, blurry starfields, visible text.
"#,
    },
    Topic {
        name: "Psychedelic and Trippy Imagery",
        instructions: r#"Instructions:
- Subjects: kaleidoscopic mandalas, fractal landscapes, faces dissolving into pattern, cosmic animals, liquid light.
- Scenes: recursive tunnels, melting horizons, endless symmetrical gardens.
- Medium: high-resolution digital art, blacklight poster, fractal render.
- Style: 1960s poster art, visionary art, op art.
- Artist influence: Alex Grey, Peter Max, Victor Moscoso.
- Detail: intricate repeating pattern, sharp linework at every scale.
- Atmosphere: glow, iridescence, flowing motion.
- Color: saturated complementary contrast, neon on deep black.
- Lighting: self-luminous forms, bloom.
- Avoid: muddy colors, uneven pattern repetition, text.
"#,
    },
];

/// Lookup table over the static topic list.
#[derive(Debug, Clone, Copy)]
pub struct TopicCatalog {
    topics: &'static [Topic],
}

impl Default for TopicCatalog {
    fn default() -> Self {
        Self { topics: TOPICS }
    }
}

impl TopicCatalog {
    pub fn new(topics: &'static [Topic]) -> Self {
        Self { topics }
    }

    pub fn topics(&self) -> &'static [Topic] {
        self.topics
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<Topic> {
        self.topics
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name.trim()))
            .copied()
    }

    /// 1-based lookup, matching the numbered menu.
    pub fn by_index(&self, index: usize) -> Option<Topic> {
        index
            .checked_sub(1)
            .and_then(|i| self.topics.get(i))
            .copied()
    }

    pub fn random(&self) -> Option<Topic> {
        self.topics.choose(&mut rand::thread_rng()).copied()
    }

    /// Resolve a name or a menu number.
    pub fn resolve(&self, selector: &str) -> Option<Topic> {
        match selector.trim().parse::<usize>() {
            Ok(index) => self.by_index(index),
            Err(_) => self.get(selector),
        }
    }
}
