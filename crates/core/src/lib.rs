pub mod audio {
    pub mod domain {
        pub mod audio_reader;
        pub mod audio_segment;
    }
    pub mod infrastructure {
        pub mod audio_stager;
        pub mod ffmpeg_audio_reader;
    }
}

pub mod recognition {
    pub mod domain {
        pub mod backend_selector;
        pub mod decoding_config;
        pub mod quality_gate;
        pub mod recognized_segment;
        pub mod speech_recognizer;
    }
    pub mod infrastructure;
}

pub mod text {
    pub mod domain {
        pub mod fallback_generator;
        pub mod text_normalizer;
    }
}

pub mod pipeline {
    pub mod audio_payload;
    pub mod transcribe_use_case;
    pub mod transcription_error;
    pub mod transcription_result;
}

pub mod shared {
    pub mod constants;
    pub mod model_resolver;
}
