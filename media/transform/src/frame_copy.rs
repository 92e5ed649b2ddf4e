/*!
    Copying between FFmpeg frames and media-types frames.

    FFmpeg frames carry per-plane strides that may be wider than the
    visible row. Frames built here are tightly packed: every plane's stride
    equals its row size.
*/

use ffmpeg_next::util::frame::{audio::Audio as AudioFrameFFmpeg, video::Video as VideoFrameFFmpeg};

use media_source::convert::{
    channel_layout_to_ffmpeg, pixel_format_to_ffmpeg, sample_format_to_ffmpeg,
};
use media_types::{Error, Frame, Par, Plane, Pts, Result};

/**
    Copy a video frame into a newly allocated FFmpeg frame.
*/
pub fn video_to_ffmpeg(frame: &Frame) -> Result<VideoFrameFFmpeg> {
    let video = frame
        .par()
        .as_video()
        .ok_or_else(|| Error::invalid_data(format!("expected video frame, got {}", frame.kind())))?;
    let planes = frame.planes()?;

    let pixel = pixel_format_to_ffmpeg(video.pixel_format)?;
    let mut dst = VideoFrameFFmpeg::new(pixel, video.width, video.height);

    let layout = video.pixel_format.plane_layout(video.width, video.height);
    for (index, ((row_bytes, rows), plane)) in layout.into_iter().zip(planes).enumerate() {
        let dst_stride = dst.stride(index);
        let dst_data = dst.data_mut(index);
        for y in 0..rows {
            let src_start = y * plane.stride;
            let dst_start = y * dst_stride;
            dst_data[dst_start..dst_start + row_bytes]
                .copy_from_slice(&plane.data[src_start..src_start + row_bytes]);
        }
    }

    dst.set_pts(frame.pts().map(|p| p.0));
    Ok(dst)
}

/**
    Copy an FFmpeg video frame into a frame described by `par`.

    `par` must describe the FFmpeg frame's pixel format and dimensions.
*/
pub fn video_from_ffmpeg(src: &VideoFrameFFmpeg, par: Par) -> Result<Frame> {
    let video = par
        .as_video()
        .ok_or_else(|| Error::invalid_data("expected a video layout"))?;
    if src.width() != video.width || src.height() != video.height {
        return Err(Error::invalid_data(format!(
            "frame is {}x{}, layout says {}x{}",
            src.width(),
            src.height(),
            video.width,
            video.height
        )));
    }

    let layout = video.pixel_format.plane_layout(video.width, video.height);
    if src.planes() < layout.len() {
        return Err(Error::invalid_data(format!(
            "frame has {} planes, {:?} needs {}",
            src.planes(),
            video.pixel_format,
            layout.len()
        )));
    }

    let mut planes = Vec::with_capacity(layout.len());
    for (index, (row_bytes, rows)) in layout.into_iter().enumerate() {
        let stride = src.stride(index);
        let data = src.data(index);
        let mut plane = Vec::with_capacity(row_bytes * rows);
        for y in 0..rows {
            let row_start = y * stride;
            plane.extend_from_slice(&data[row_start..row_start + row_bytes]);
        }
        planes.push(Plane::new(plane, row_bytes));
    }

    Ok(Frame::from_planes(par, 0, planes)?.with_pts(src.pts().map(Pts)))
}

/**
    Copy an audio frame into a newly allocated FFmpeg frame.
*/
pub fn audio_to_ffmpeg(frame: &Frame) -> Result<AudioFrameFFmpeg> {
    let audio = frame
        .par()
        .as_audio()
        .ok_or_else(|| Error::invalid_data(format!("expected audio frame, got {}", frame.kind())))?;
    let planes = frame.planes()?;

    let sample = sample_format_to_ffmpeg(audio.sample_format)?;
    let layout = channel_layout_to_ffmpeg(audio.channel_layout);
    let mut dst = AudioFrameFFmpeg::new(sample, frame.samples(), layout);
    dst.set_rate(audio.sample_rate);

    // FFmpeg only fills linesize[0] for audio; every plane has that size.
    let plane_size = dst.data(0).len();
    if planes.len() > dst.planes() {
        return Err(Error::invalid_data(format!(
            "frame has {} planes, destination has {}",
            planes.len(),
            dst.planes()
        )));
    }
    for (index, plane) in planes.iter().enumerate() {
        let len = plane.data.len();
        if len > plane_size {
            return Err(Error::invalid_data(format!(
                "audio plane {index} holds {len} bytes, destination holds {plane_size}"
            )));
        }
        // SAFETY: the frame was allocated with one plane per channel (or a
        // single packed plane), each `plane_size` bytes long. Planes past
        // the eighth are only reachable through `extended_data`.
        unsafe {
            let ptr = *(*dst.as_mut_ptr()).extended_data.add(index);
            std::slice::from_raw_parts_mut(ptr, plane_size)[..len].copy_from_slice(&plane.data);
        }
    }

    dst.set_pts(frame.pts().map(|p| p.0));
    Ok(dst)
}

/**
    Copy an FFmpeg audio frame into a frame described by `par`.

    `par` must describe the FFmpeg frame's sample format and channel count.
    Planar input stays planar.
*/
pub fn audio_from_ffmpeg(src: &AudioFrameFFmpeg, par: Par) -> Result<Frame> {
    let audio = par
        .as_audio()
        .ok_or_else(|| Error::invalid_data("expected an audio layout"))?;

    let samples = src.samples();
    if samples == 0 {
        return Err(Error::invalid_data("audio frame has zero samples"));
    }
    if src.planes() == 0 {
        return Err(Error::invalid_data(
            "audio frame has no data planes (linesize is 0)",
        ));
    }

    let channels = audio.channel_count() as usize;
    let bytes_per_sample = audio.sample_format.bytes_per_sample();
    let (plane_count, plane_bytes) = if audio.sample_format.is_planar() {
        (channels, samples * bytes_per_sample)
    } else {
        (1, samples * bytes_per_sample * channels)
    };

    if src.planes() < plane_count {
        return Err(Error::invalid_data(format!(
            "audio frame has {} planes, expected {plane_count}",
            src.planes()
        )));
    }

    let plane_size = src.data(0).len();
    if plane_size < plane_bytes {
        return Err(Error::invalid_data(format!(
            "audio plane size {plane_size} is less than expected {plane_bytes} bytes for {samples} samples"
        )));
    }

    let planes = (0..plane_count)
        .map(|index| {
            // SAFETY: planar audio keeps every plane at linesize[0] bytes,
            // checked above against the plane count. `extended_data` holds
            // all of them, `data` only the first eight.
            let data = unsafe {
                let ptr = *(*src.as_ptr()).extended_data.add(index);
                std::slice::from_raw_parts(ptr, plane_size)
            };
            Plane::new(data[..plane_bytes].to_vec(), plane_bytes)
        })
        .collect();

    Ok(Frame::from_planes(par, samples, planes)?.with_pts(src.pts().map(Pts)))
}
