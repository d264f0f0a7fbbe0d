// Shared test fixtures for the use-case tests.

use std::path::Path;

use crate::application::train_use_case::TrainConfig;

pub fn write_corpus(dir: &Path) -> String {
    let path = dir.join("movies.csv");
    std::fs::write(
        &path,
        "Title,Synopsis,Genre\n\
         Alien,A crew meets a deadly alien.,sci_fi\n\
         Heat,A thief and a cop collide.,crime\n\
         Up,An old man flies his house.,animation\n\
         Rocky,A boxer gets one shot.,sports\n\
         Jaws,A shark hunts a beach town.,horror\n\
         Fargo,A crime goes very wrong.,crime\n",
    )
    .unwrap();
    path.to_string_lossy().into_owned()
}

/// Two epochs of a very small model over the six-movie corpus.
pub fn tiny_config(dir: &Path) -> TrainConfig {
    TrainConfig {
        corpus_path:           write_corpus(dir),
        checkpoint_dir:        dir.join("ckpt").to_string_lossy().into_owned(),
        epochs:                2,
        batch_size:            2,
        held_out_fraction:     0.2,
        embedding_dim:         4,
        encoder_hidden:        6,
        latent_hidden:         2,
        decoder_hidden:        3,
        decoder_output_hidden: 5,
        ..TrainConfig::default()
    }
}
