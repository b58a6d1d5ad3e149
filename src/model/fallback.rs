use crate::model::builder::BlueprintBuilder;
use crate::model::{Alternatives, Blueprint};

/// Blueprint set shown when compose fails and no earlier result is available.
pub fn default_alternatives() -> Alternatives {
    Alternatives {
        alternatives: vec![speech_pipeline(), vision_pipeline()],
    }
}

fn speech_pipeline() -> Blueprint {
    BlueprintBuilder::new("Transcribe audio and summarise the transcript")
        .task(1, "Speech to Text", "whisper-base")
            .root()
            .text("transcript")
            .build()
        .task(2, "Summarisation", "bart-large-cnn")
            .depends_on(&[1])
            .text("summary")
            .build()
        .build()
}

fn vision_pipeline() -> Blueprint {
    BlueprintBuilder::new("Detect faces and describe the scene")
        .task(1, "Face Detection", "mtcnn-face")
            .root()
            .image("faces")
            .build()
        .task(2, "Image Captioning", "blip-base")
            .root()
            .text("caption")
            .build()
        .task(3, "Report", "report-writer")
            .depends_on(&[1, 2])
            .document("report")
            .build()
        .build()
}
