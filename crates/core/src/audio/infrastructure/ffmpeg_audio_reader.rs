use std::path::Path;

use ffmpeg_next::codec::decoder;
use ffmpeg_next::format::sample::Type as SampleLayout;
use ffmpeg_next::format::Sample;
use ffmpeg_next::software::resampling;
use ffmpeg_next::util::frame::audio::Audio as AudioFrame;
use ffmpeg_next::ChannelLayout;
use thiserror::Error;

use crate::audio::domain::audio_reader::AudioReader;
use crate::audio::domain::audio_segment::AudioSegment;

#[derive(Error, Debug)]
pub enum VoiceDecodeError {
    #[error("audio stream decoded to zero samples")]
    NoSamples,
    #[error("audio stream has no sample rate")]
    UnknownRate,
}

/// Decodes a voice message (Ogg/Opus, m4a, wav, ...) with ffmpeg-next into
/// mono f32 at the requested rate.
///
/// Only the best audio stream is read. A container without one yields
/// `Ok(None)`; a stream that produces no samples is an error.
pub struct FfmpegAudioReader;

impl AudioReader for FfmpegAudioReader {
    fn read_audio(
        &self,
        path: &Path,
        target_sample_rate: u32,
    ) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let mut ictx = ffmpeg_next::format::input(path)?;
        let (stream_index, decoder) = match ictx.streams().best(ffmpeg_next::media::Type::Audio) {
            Some(stream) => {
                let ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
                (stream.index(), ctx.decoder().audio()?)
            }
            None => return Ok(None),
        };

        let mut voice = MonoDecoder::new(decoder, target_sample_rate)?;
        for (stream, packet) in ictx.packets() {
            if stream.index() == stream_index {
                voice.decoder.send_packet(&packet)?;
                voice.drain()?;
            }
        }
        let samples = voice.finish()?;

        if samples.is_empty() {
            return Err(VoiceDecodeError::NoSamples.into());
        }
        log::debug!(
            "Decoded {} samples ({:.2}s) from {}",
            samples.len(),
            samples.len() as f64 / target_sample_rate as f64,
            path.display()
        );
        Ok(Some(AudioSegment::new(samples, target_sample_rate, 1)))
    }
}

/// Audio decoder chained to a resampler that downmixes to planar mono f32.
struct MonoDecoder {
    decoder: decoder::Audio,
    resampler: resampling::Context,
    decoded: AudioFrame,
    resampled: AudioFrame,
    samples: Vec<f32>,
}

impl MonoDecoder {
    fn new(decoder: decoder::Audio, target_rate: u32) -> Result<Self, Box<dyn std::error::Error>> {
        if decoder.rate() == 0 {
            return Err(VoiceDecodeError::UnknownRate.into());
        }
        // Opus streams often leave the layout unset
        let layout = if decoder.channel_layout().is_empty() {
            ChannelLayout::default(decoder.channels() as i32)
        } else {
            decoder.channel_layout()
        };
        let resampler = resampling::Context::get(
            decoder.format(),
            layout,
            decoder.rate(),
            Sample::F32(SampleLayout::Planar),
            ChannelLayout::MONO,
            target_rate,
        )?;

        Ok(Self {
            decoder,
            resampler,
            decoded: AudioFrame::empty(),
            resampled: AudioFrame::empty(),
            samples: Vec::new(),
        })
    }

    fn drain(&mut self) -> Result<(), ffmpeg_next::Error> {
        while self.decoder.receive_frame(&mut self.decoded).is_ok() {
            self.resampler.run(&self.decoded, &mut self.resampled)?;
            push_plane(&self.resampled, &mut self.samples);
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<f32>, ffmpeg_next::Error> {
        self.decoder.send_eof()?;
        self.drain()?;
        if let Ok(Some(delay)) = self.resampler.flush(&mut self.resampled) {
            if delay.output > 0 {
                push_plane(&self.resampled, &mut self.samples);
            }
        }
        Ok(self.samples)
    }
}

fn push_plane(frame: &AudioFrame, out: &mut Vec<f32>) {
    let n = frame.samples();
    if n == 0 {
        return;
    }
    let bytes = frame.data(0);
    out.extend(
        bytes
            .chunks_exact(4)
            .take(n)
            .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]])),
    );
}
