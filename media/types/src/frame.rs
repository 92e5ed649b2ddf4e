/*!
    Decoded frames.
*/

use crate::{Error, MediaKind, Par, Params, Pts, Result};

/**
    One plane of decoded samples or pixels.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plane {
    pub data: Vec<u8>,
    /// Bytes per row for video, the plane length for audio.
    pub stride: usize,
}

impl Plane {
    pub fn new(data: Vec<u8>, stride: usize) -> Self {
        Self { data, stride }
    }

    fn zeroed(row_bytes: usize, rows: usize) -> Self {
        Self {
            data: vec![0; row_bytes * rows],
            stride: row_bytes,
        }
    }
}

/**
    A decoded unit of audio samples or video pixels.

    A frame starts out unallocated: it knows its format but owns no
    buffers. Plane accessors fail with [`Error::NotAllocated`] until the
    frame is allocated with [`Frame::alloc`] or built from existing planes.

    Audio frames hold one plane per channel for planar sample formats and a
    single interleaved plane otherwise. Video frames hold the planes given by
    [`PixelFormat::plane_layout`](crate::PixelFormat::plane_layout).

    Cloning deep-copies the planes.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    par: Par,
    pts: Option<Pts>,
    samples: usize,
    planes: Vec<Plane>,
}

impl Frame {
    /**
        Create an unallocated frame for the given format.
    */
    pub fn new(par: Par) -> Self {
        Self {
            par,
            pts: None,
            samples: 0,
            planes: Vec::new(),
        }
    }

    /**
        Create a frame from already decoded planes.

        The plane count and sizes are checked against the format.
    */
    pub fn from_planes(par: Par, samples: usize, planes: Vec<Plane>) -> Result<Self> {
        let layout = plane_layout(&par, samples)?;
        if layout.len() != planes.len() {
            return Err(Error::invalid_data(format!(
                "{} frame needs {} planes, got {}",
                par.kind(),
                layout.len(),
                planes.len()
            )));
        }
        for (index, ((row_bytes, rows), plane)) in layout.iter().zip(&planes).enumerate() {
            let needed = if *rows == 0 {
                0
            } else {
                plane.stride * (rows - 1) + row_bytes
            };
            if plane.stride < *row_bytes || plane.data.len() < needed {
                return Err(Error::invalid_data(format!(
                    "plane {index} holds {} bytes with stride {}, need {needed} with stride >= {row_bytes}",
                    plane.data.len(),
                    plane.stride
                )));
            }
        }

        Ok(Self {
            par,
            pts: None,
            samples,
            planes,
        })
    }

    /**
        Allocate zeroed buffers for this frame's format.

        `samples` is the number of samples per channel for audio and is
        ignored for video. Reallocating replaces any existing planes.
    */
    pub fn alloc(&mut self, samples: usize) -> Result<()> {
        let layout = plane_layout(&self.par, samples)?;
        self.planes = layout
            .into_iter()
            .map(|(row_bytes, rows)| Plane::zeroed(row_bytes, rows))
            .collect();
        self.samples = if self.par.kind() == MediaKind::Audio {
            samples
        } else {
            0
        };
        Ok(())
    }

    /**
        Builder: set the presentation timestamp.
    */
    pub fn with_pts(mut self, pts: Option<Pts>) -> Self {
        self.pts = pts;
        self
    }

    pub fn is_allocated(&self) -> bool {
        !self.planes.is_empty()
    }

    pub fn par(&self) -> &Par {
        &self.par
    }

    pub fn kind(&self) -> MediaKind {
        self.par.kind()
    }

    pub fn pts(&self) -> Option<Pts> {
        self.pts
    }

    pub fn set_pts(&mut self, pts: Option<Pts>) {
        self.pts = pts;
    }

    /**
        Samples per channel (audio only, zero for video).
    */
    pub fn samples(&self) -> usize {
        self.samples
    }

    /**
        Width in pixels (video only, zero for audio).
    */
    pub fn width(&self) -> u32 {
        self.par.as_video().map_or(0, |v| v.width)
    }

    /**
        Height in pixels (video only, zero for audio).
    */
    pub fn height(&self) -> u32 {
        self.par.as_video().map_or(0, |v| v.height)
    }

    pub fn planes(&self) -> Result<&[Plane]> {
        if self.is_allocated() {
            Ok(&self.planes)
        } else {
            Err(Error::NotAllocated)
        }
    }

    pub fn plane(&self, index: usize) -> Result<&[u8]> {
        self.planes()?
            .get(index)
            .map(|p| p.data.as_slice())
            .ok_or_else(|| Error::invalid_data(format!("plane {index} out of range")))
    }

    pub fn plane_mut(&mut self, index: usize) -> Result<&mut [u8]> {
        if !self.is_allocated() {
            return Err(Error::NotAllocated);
        }
        self.planes
            .get_mut(index)
            .map(|p| p.data.as_mut_slice())
            .ok_or_else(|| Error::invalid_data(format!("plane {index} out of range")))
    }

    /**
        Returns the planes, consuming the frame.
    */
    pub fn into_planes(self) -> Vec<Plane> {
        self.planes
    }

    /**
        Returns true if both frames are allocated and share a decoded layout.
    */
    pub fn matches_format(&self, other: &Frame) -> bool {
        self.is_allocated() && other.is_allocated() && self.par.matches_format(&other.par)
    }
}

/**
    Compute `(row_bytes, rows)` for each plane a frame of `par` needs.
*/
fn plane_layout(par: &Par, samples: usize) -> Result<Vec<(usize, usize)>> {
    match &par.params {
        Params::Audio(audio) => {
            if samples == 0 {
                return Err(Error::invalid_parameters("audio frame needs at least one sample"));
            }
            let channels = audio.channel_count() as usize;
            if channels == 0 {
                return Err(Error::invalid_parameters("audio frame has no channels"));
            }
            let bytes = audio.sample_format.bytes_per_sample();
            if audio.sample_format.is_planar() {
                Ok(vec![(samples * bytes, 1); channels])
            } else {
                Ok(vec![(samples * bytes * channels, 1)])
            }
        }
        Params::Video(video) => {
            if video.width == 0 || video.height == 0 {
                return Err(Error::invalid_parameters("video frame has zero dimensions"));
            }
            Ok(video.pixel_format.plane_layout(video.width, video.height))
        }
        Params::Subtitle | Params::Data => Err(Error::unsupported_format(format!(
            "{} streams do not decode into frames",
            par.kind()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AudioParams, ChannelLayout, PixelFormat, Rational, SampleFormat, VideoParams};

    fn audio_par(format: SampleFormat) -> Par {
        Par::audio(
            AudioParams::new(format, ChannelLayout::Stereo, 48000),
            Rational::new(1, 48000),
        )
    }

    fn video_par(width: u32, height: u32) -> Par {
        Par::video(
            VideoParams::new(PixelFormat::Yuv420p, width, height),
            Rational::new(1, 90000),
        )
    }

    #[test]
    fn unallocated_frame_refuses_plane_access() {
        let mut frame = Frame::new(video_par(4, 4));
        assert!(!frame.is_allocated());
        assert!(matches!(frame.plane(0), Err(Error::NotAllocated)));
        assert!(matches!(frame.plane_mut(0), Err(Error::NotAllocated)));
    }

    #[test]
    fn alloc_video_planes() {
        let mut frame = Frame::new(video_par(4, 2));
        frame.alloc(0).unwrap();
        let planes = frame.planes().unwrap();
        assert_eq!(planes.len(), 3);
        assert_eq!(planes[0].data.len(), 8);
        assert_eq!(planes[1].data.len(), 2);
        assert_eq!(frame.samples(), 0);
        assert_eq!((frame.width(), frame.height()), (4, 2));
    }

    #[test]
    fn alloc_audio_packed_and_planar() {
        let mut packed = Frame::new(audio_par(SampleFormat::S16));
        packed.alloc(1024).unwrap();
        assert_eq!(packed.planes().unwrap().len(), 1);
        assert_eq!(packed.plane(0).unwrap().len(), 1024 * 2 * 2);

        let mut planar = Frame::new(audio_par(SampleFormat::F32p));
        planar.alloc(1024).unwrap();
        assert_eq!(planar.planes().unwrap().len(), 2);
        assert_eq!(planar.plane(1).unwrap().len(), 1024 * 4);
        assert_eq!(planar.samples(), 1024);
    }

    #[test]
    fn alloc_rejects_subtitles() {
        let mut frame = Frame::new(Par::subtitle(Rational::new(1, 1000)));
        assert!(frame.alloc(1).is_err());
        assert!(!frame.is_allocated());
    }

    #[test]
    fn from_planes_checks_sizes() {
        let par = video_par(2, 2);
        let ok = Frame::from_planes(
            par.clone(),
            0,
            vec![
                Plane::new(vec![0; 4], 2),
                Plane::new(vec![0; 1], 1),
                Plane::new(vec![0; 1], 1),
            ],
        );
        assert!(ok.is_ok());

        let short = Frame::from_planes(par, 0, vec![Plane::new(vec![0; 3], 2)]);
        assert!(short.is_err());
    }

    #[test]
    fn from_planes_accepts_padded_stride() {
        let par = video_par(2, 2);
        let frame = Frame::from_planes(
            par,
            0,
            vec![
                Plane::new(vec![0; 18], 16),
                Plane::new(vec![0; 1], 16),
                Plane::new(vec![0; 1], 16),
            ],
        )
        .unwrap();
        assert_eq!(frame.planes().unwrap()[0].stride, 16);
    }

    #[test]
    fn matches_format_requires_allocation() {
        let empty = Frame::new(video_par(4, 4));
        let mut full = Frame::new(video_par(4, 4));
        full.alloc(0).unwrap();
        assert!(!empty.matches_format(&full));
        assert!(full.matches_format(&full.clone()));
    }
}
