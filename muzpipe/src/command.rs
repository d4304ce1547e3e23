//! Constructeur de commande pour l'outil de transcodage
//!
//! Le contrat de l'outil (compatible ffmpeg) est figé ici : l'entrée est
//! le localisateur de flux, la sortie est du WAV PCM 16 bits, 44,1 kHz,
//! stéréo, écrit sur stdout.

use muztool::ToolCommand;

/// Commande de transcodage vers WAV PCM sur stdout
pub fn transcode_command(binary: &str, source_url: &str) -> ToolCommand {
    ToolCommand::new(binary)
        .arg("-i")
        .arg(source_url)
        .arg("-f")
        .arg("wav")
        .arg("-acodec")
        .arg("pcm_s16le")
        .arg("-ar")
        .arg("44100")
        .arg("-ac")
        .arg("2")
        .arg("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcode_command_shape() {
        let cmd = transcode_command("ffmpeg", "https://cdn.example.com/a.m4a");
        assert_eq!(cmd.program, "ffmpeg");
        assert_eq!(
            cmd.args,
            vec![
                "-i",
                "https://cdn.example.com/a.m4a",
                "-f",
                "wav",
                "-acodec",
                "pcm_s16le",
                "-ar",
                "44100",
                "-ac",
                "2",
                "-"
            ]
        );
    }
}
