//! Constructeurs de commandes pour l'outil de recherche
//!
//! Le contrat de l'outil (compatible yt-dlp) est figé ici sous forme de
//! descripteurs typés. Aucune commande n'est assemblée en chaîne ailleurs.

use muztool::ToolCommand;

/// Préfixe de recherche : premier résultat seulement
const SEARCH_SCHEME: &str = "ytsearch1:";

/// Commande d'extraction des métadonnées (JSON sur stdout, rien téléchargé)
pub fn metadata_command(binary: &str, query: &str) -> ToolCommand {
    ToolCommand::new(binary)
        .arg("-j")
        .arg("--no-playlist")
        .arg("--skip-download")
        .arg(format!("{}{}", SEARCH_SCHEME, query))
}

/// Commande d'extraction du localisateur de flux (URL directe sur stdout)
///
/// Préfère le meilleur flux audio en m4a, sinon le meilleur flux audio
/// disponible.
pub fn locator_command(binary: &str, query: &str) -> ToolCommand {
    ToolCommand::new(binary)
        .arg("--get-url")
        .arg("--format")
        .arg("bestaudio[ext=m4a]/bestaudio")
        .arg("--no-playlist")
        .arg(format!("{}{}", SEARCH_SCHEME, query))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_command_shape() {
        let cmd = metadata_command("yt-dlp", "shape of you");
        assert_eq!(cmd.program, "yt-dlp");
        assert_eq!(
            cmd.args,
            vec![
                "-j",
                "--no-playlist",
                "--skip-download",
                "ytsearch1:shape of you"
            ]
        );
    }

    #[test]
    fn test_locator_command_shape() {
        let cmd = locator_command("yt-dlp", "shape of you");
        assert_eq!(
            cmd.args,
            vec![
                "--get-url",
                "--format",
                "bestaudio[ext=m4a]/bestaudio",
                "--no-playlist",
                "ytsearch1:shape of you"
            ]
        );
    }

    #[test]
    fn test_query_is_a_single_argument() {
        // La requête reste un argument unique, jamais découpée par un shell
        let cmd = metadata_command("yt-dlp", "a; rm -rf /");
        assert_eq!(cmd.args.last().unwrap(), "ytsearch1:a; rm -rf /");
    }
}
