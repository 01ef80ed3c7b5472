use serde::{Deserialize, Serialize};
use std::fmt;

/// AI mentor persona that frames the tone of a report.
///
/// The wire tag (`MarcusAI`, `MayaAI`, ...) is what clients send in
/// `aiMentor`; the display name is what ends up in the report metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
pub enum MentorPersona {
    MarcusAI,
    MayaAI,
    SteveAI,
    KobeAI,
    MandelaAI,
    KobunAI,
}

impl MentorPersona {
    pub const ALL: [MentorPersona; 6] = [
        MentorPersona::MarcusAI,
        MentorPersona::MayaAI,
        MentorPersona::SteveAI,
        MentorPersona::KobeAI,
        MentorPersona::MandelaAI,
        MentorPersona::KobunAI,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            MentorPersona::MarcusAI => "Marcus Aurelius",
            MentorPersona::MayaAI => "Maya Angelou",
            MentorPersona::SteveAI => "Steve Jobs",
            MentorPersona::KobeAI => "Kobe Bryant",
            MentorPersona::MandelaAI => "Nelson Mandela",
            MentorPersona::KobunAI => "Kobun Chino",
        }
    }

    pub fn specialty(&self) -> &'static str {
        match self {
            MentorPersona::MarcusAI => "Stoic wisdom & leadership insights",
            MentorPersona::MayaAI => "Emotional intelligence & empathy",
            MentorPersona::SteveAI => "Innovation & perfectionism",
            MentorPersona::KobeAI => "Mamba mentality & excellence",
            MentorPersona::MandelaAI => "Reconciliation & moral courage",
            MentorPersona::KobunAI => "Zen wisdom & mindfulness",
        }
    }

    /// Voice description used to steer the generator's tone.
    pub fn voice(&self) -> &'static str {
        match self {
            MentorPersona::MarcusAI => "Philosophical, reflective, focused on virtue and duty",
            MentorPersona::MayaAI => "Compassionate, wise, focused on human connection and growth",
            MentorPersona::SteveAI => "Direct, perfectionist, focused on excellence and innovation",
            MentorPersona::KobeAI => "Competitive, disciplined, focused on continuous improvement",
            MentorPersona::MandelaAI => "Patient, forgiving, focused on unity and moral leadership",
            MentorPersona::KobunAI => "Mindful, present, focused on awareness and simplicity",
        }
    }
}

impl fmt::Display for MentorPersona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_tags_round_trip() {
        for persona in MentorPersona::ALL {
            let json = serde_json::to_string(&persona).unwrap();
            let back: MentorPersona = serde_json::from_str(&json).unwrap();
            assert_eq!(back, persona);
        }
        assert_eq!(serde_json::to_string(&MentorPersona::MayaAI).unwrap(), "\"MayaAI\"");
    }

    #[test]
    fn test_unknown_persona_rejected() {
        assert!(serde_json::from_str::<MentorPersona>("\"OprahAI\"").is_err());
    }

    #[test]
    fn test_every_persona_has_a_voice() {
        for persona in MentorPersona::ALL {
            assert!(!persona.display_name().is_empty());
            assert!(!persona.specialty().is_empty());
            assert!(!persona.voice().is_empty());
        }
    }
}
