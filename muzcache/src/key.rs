//! Dérivation des clés canoniques du cache
//!
//! Deux requêtes ne différant que par la casse ou les espaces en bordure
//! doivent produire la même clé. La normalisation est une fonction pure,
//! sans I/O, et idempotente une fois le préfixe de namespace posé.

/// Clé canonique d'une entrée du cache (namespace + requête normalisée)
pub type CacheKey = String;

/// Namespace d'une entrée, détermine le domaine de TTL
///
/// Les localisateurs de flux expirent plus tôt que les métadonnées car
/// l'émetteur externe peut les invalider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// Métadonnées de morceau (titre, durée, artiste)
    Song,
    /// Localisateur de flux audio (URL directe, à durée de vie limitée)
    Stream,
}

impl Namespace {
    /// Préfixe posé devant chaque clé du namespace
    pub fn prefix(&self) -> &'static str {
        match self {
            Namespace::Song => "song:",
            Namespace::Stream => "stream:",
        }
    }
}

/// Dérive la clé canonique d'une requête brute
///
/// Supprime les espaces en bordure, passe en minuscules et pose le
/// préfixe du namespace. Une entrée déjà normalisée ressort inchangée.
pub fn normalize(namespace: Namespace, raw: &str) -> CacheKey {
    let trimmed = raw.trim().to_lowercase();
    if let Some(rest) = trimmed.strip_prefix(namespace.prefix()) {
        return format!("{}{}", namespace.prefix(), rest);
    }
    format!("{}{}", namespace.prefix(), trimmed)
}
