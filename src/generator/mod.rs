//! Progressive scenario generation for chaos-forge.
//!
//! This module implements the complete pipeline for one scenario and for a
//! full curriculum:
//!
//! 1. **Tool Selection** - Distinct tools drawn from the domain pool within the profile's range
//! 2. **Deliberation** - Multi-voice internal dialogue resolved to a strategy and a confidence
//! 3. **Reality Breaks** - Disruptive discoveries drawn from the selected tools' failure modes
//! 4. **Confidence Trajectory** - Damped, clamped confidence path across the event timeline
//! 5. **Outcome** - Success level and lessons derived from the trajectory and breaks
//! 6. **Curriculum** - Balanced batches across difficulty levels and domains
//!
//! Every stage takes the random source explicitly, so a fixed seed reproduces
//! the same content.
//!
//! # Example
//!
//! ```ignore
//! use chaos_forge::catalog::Domain;
//! use chaos_forge::difficulty::DifficultyLevel;
//! use chaos_forge::generator::{build_curriculum, ChaosGenerator};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let generator = ChaosGenerator::standard()?;
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//!
//! let scenario = generator.generate_progressive_scenario(
//!     Domain::Technical,
//!     DifficultyLevel::Chaotic,
//!     &mut rng,
//! )?;
//! let curriculum = build_curriculum(&generator, 25, None, &mut rng)?;
//! ```

pub mod assembler;
pub mod confidence;
pub mod curriculum;
pub mod deliberation;
pub mod outcome;
pub mod reality_break;
pub mod scenario;
pub mod tools;

pub use assembler::{ChaosGenerator, EnhancementOptions};
pub use confidence::{build_trajectory, TimelineEvent, CONFIDENCE_CEILING, CONFIDENCE_FLOOR};
pub use curriculum::{build_curriculum, build_curriculum_parallel, Curriculum, CurriculumSummary};
pub use deliberation::{
    synthesize_deliberation, Deliberation, DeliberationContext, Voice, VoiceName,
};
pub use outcome::{synthesize_outcome, FinalOutcome, SuccessLevel, NO_INCIDENT_LESSON};
pub use reality_break::{maybe_inject_breaks, AdaptationKind, RealityBreak};
pub use scenario::{MetacognitiveMoment, Scenario};
pub use tools::select_tools;
