use crate::error::IcoError;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Seek, SeekFrom, Write};

//===========================================================================//

/// The length of the ICONDIR header, in bytes.
pub const HEADER_LEN: u32 = 6;

/// The length of one ICONDIRENTRY record, in bytes.
pub const ENTRY_LEN: u32 = 16;

// The resource type number for icons (cursors would be 2).
const ICON_TYPE: u16 = 1;

// Every embedded image is a single-plane, 8-bit-per-channel RGBA PNG.
const COLOR_PLANES: u16 = 1;
const BITS_PER_PIXEL: u16 = 32;

// The signature that all PNG files start with.
pub(crate) const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G'];

/// The largest icon dimension an ICO directory entry can describe.
pub const MAX_ICON_SIZE: u32 = 256;

//===========================================================================//

/// The width and height, in pixels, of one square icon variant.  Always in
/// the range `1..=256`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
pub struct IconSize(u32);

impl IconSize {
    /// Returns the size, or `None` if `pixels` is zero or larger than 256.
    pub fn new(pixels: u32) -> Option<IconSize> {
        if (1..=MAX_ICON_SIZE).contains(&pixels) {
            Some(IconSize(pixels))
        } else {
            None
        }
    }

    /// Returns the width (and height) in pixels.
    pub fn pixels(self) -> u32 {
        self.0
    }

    /// Returns the value stored in a directory entry's one-byte width/height
    /// field, where 256 doesn't fit and is written as zero.
    pub fn directory_byte(self) -> u8 {
        if self.0 == MAX_ICON_SIZE {
            0
        } else {
            self.0 as u8
        }
    }

    /// Inverse of `directory_byte`.
    pub fn from_directory_byte(byte: u8) -> IconSize {
        if byte == 0 {
            IconSize(MAX_ICON_SIZE)
        } else {
            IconSize(byte as u32)
        }
    }

    /// Validates a caller-supplied size list.  Fails if the list is empty,
    /// if any entry is out of range, or if there are more entries than the
    /// header's 16-bit count can hold.
    pub fn parse_list(sizes: &[u32]) -> Result<Vec<IconSize>, IcoError> {
        if sizes.is_empty() {
            return Err(IcoError::InvalidInput(
                "At least one icon size is required".to_string(),
            ));
        }
        if sizes.len() > (u16::MAX as usize) {
            invalid_sizes!(
                "Too many icon sizes (was {}, but max is {})",
                sizes.len(),
                u16::MAX
            );
        }
        let mut parsed = Vec::with_capacity(sizes.len());
        for (index, &pixels) in sizes.iter().enumerate() {
            match IconSize::new(pixels) {
                Some(size) => parsed.push(size),
                None => invalid_sizes!(
                    "Invalid icon size at index {} (was {}, but must be \
                     between 1 and {})",
                    index,
                    pixels,
                    MAX_ICON_SIZE
                ),
            }
        }
        Ok(parsed)
    }
}

impl TryFrom<u32> for IconSize {
    type Error = IcoError;

    fn try_from(pixels: u32) -> Result<IconSize, IcoError> {
        match IconSize::new(pixels) {
            Some(size) => Ok(size),
            None => invalid_sizes!(
                "Invalid icon size (was {}, but must be between 1 and {})",
                pixels,
                MAX_ICON_SIZE
            ),
        }
    }
}

impl From<IconSize> for u32 {
    fn from(size: IconSize) -> u32 {
        size.0
    }
}

//===========================================================================//

/// How the payload length and offset are packed into each 16-byte
/// directory entry.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DirectoryLayout {
    /// The documented ICONDIRENTRY layout: planes at 4, bits-per-pixel at 6,
    /// length at 8, offset at 12.  Readable by real-world ICO consumers.
    #[default]
    Canonical,
    /// Planes at 4, length at 6, offset at 10, two zero bytes at 14.  There
    /// is no bits-per-pixel field, and the length overlaps where the
    /// documented layout keeps it.  Most ICO readers can't parse this.
    Legacy,
}

//===========================================================================//

/// One directory entry of an ICO file: the dimensions of an embedded image
/// and the location of its payload.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct IcoDirEntry {
    width: IconSize,
    height: IconSize,
    num_colors: u8,
    color_planes: u16,
    bits_per_pixel: u16,
    data_size: u32,
    data_offset: u32,
}

impl IcoDirEntry {
    pub(crate) fn for_payload(
        size: IconSize,
        data_size: u32,
        data_offset: u32,
    ) -> IcoDirEntry {
        IcoDirEntry {
            width: size,
            height: size,
            num_colors: 0,
            color_planes: COLOR_PLANES,
            bits_per_pixel: BITS_PER_PIXEL,
            data_size,
            data_offset,
        }
    }

    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        self.width.pixels()
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        self.height.pixels()
    }

    /// Returns the palette size (zero for images without a palette).
    pub fn num_colors(&self) -> u8 {
        self.num_colors
    }

    /// Returns the color plane count.
    pub fn color_planes(&self) -> u16 {
        self.color_planes
    }

    /// Returns the bits-per-pixel, or zero when read from a
    /// [`DirectoryLayout::Legacy`] file, which has no such field.
    pub fn bits_per_pixel(&self) -> u16 {
        self.bits_per_pixel
    }

    /// Returns the length of the payload, in bytes.
    pub fn data_size(&self) -> u32 {
        self.data_size
    }

    /// Returns the absolute offset of the payload from the start of the
    /// file.
    pub fn data_offset(&self) -> u32 {
        self.data_offset
    }

    /// Writes this entry as exactly 16 bytes.
    pub fn write<W: Write>(
        &self,
        mut writer: W,
        layout: DirectoryLayout,
    ) -> io::Result<()> {
        writer.write_u8(self.width.directory_byte())?;
        writer.write_u8(self.height.directory_byte())?;
        writer.write_u8(self.num_colors)?;
        writer.write_u8(0)?; // reserved
        writer.write_u16::<LittleEndian>(self.color_planes)?;
        match layout {
            DirectoryLayout::Canonical => {
                writer.write_u16::<LittleEndian>(self.bits_per_pixel)?;
                writer.write_u32::<LittleEndian>(self.data_size)?;
                writer.write_u32::<LittleEndian>(self.data_offset)?;
            }
            DirectoryLayout::Legacy => {
                writer.write_u32::<LittleEndian>(self.data_size)?;
                writer.write_u32::<LittleEndian>(self.data_offset)?;
                writer.write_u16::<LittleEndian>(0)?; // padding
            }
        }
        Ok(())
    }

    /// Reads one 16-byte entry.
    pub fn read<R: Read>(
        mut reader: R,
        layout: DirectoryLayout,
    ) -> io::Result<IcoDirEntry> {
        let width = reader.read_u8()?;
        let height = reader.read_u8()?;
        let num_colors = reader.read_u8()?;
        let reserved = reader.read_u8()?;
        if reserved != 0 {
            invalid_data!(
                "Invalid reserved field value in ICONDIRENTRY \
                 (was {}, but must be 0)",
                reserved
            );
        }
        let color_planes = reader.read_u16::<LittleEndian>()?;
        let (bits_per_pixel, data_size, data_offset) = match layout {
            DirectoryLayout::Canonical => {
                let bits_per_pixel = reader.read_u16::<LittleEndian>()?;
                let data_size = reader.read_u32::<LittleEndian>()?;
                let data_offset = reader.read_u32::<LittleEndian>()?;
                (bits_per_pixel, data_size, data_offset)
            }
            DirectoryLayout::Legacy => {
                let data_size = reader.read_u32::<LittleEndian>()?;
                let data_offset = reader.read_u32::<LittleEndian>()?;
                let _padding = reader.read_u16::<LittleEndian>()?;
                (0, data_size, data_offset)
            }
        };
        Ok(IcoDirEntry {
            width: IconSize::from_directory_byte(width),
            height: IconSize::from_directory_byte(height),
            num_colors,
            color_planes,
            bits_per_pixel,
            data_size,
            data_offset,
        })
    }
}

//===========================================================================//

/// Writes a complete ICO file: the header, one directory entry per payload,
/// then the payloads themselves, all in the order given.  Offsets are
/// assigned contiguously starting right after the directory.
pub(crate) fn write_ico(
    payloads: &[(IconSize, Vec<u8>)],
    layout: DirectoryLayout,
) -> Result<Vec<u8>, IcoError> {
    if payloads.is_empty() || payloads.len() > (u16::MAX as usize) {
        invalid_sizes!(
            "Image count must be between 1 and {} (was {})",
            u16::MAX,
            payloads.len()
        );
    }
    let count = payloads.len() as u32;
    let directory_end = HEADER_LEN + ENTRY_LEN * count;
    let mut entries = Vec::with_capacity(payloads.len());
    let mut data_offset = directory_end;
    for (size, data) in payloads.iter() {
        let overflow = || IcoError::Encoding {
            size: size.pixels(),
            source: io::Error::new(
                io::ErrorKind::InvalidInput,
                "ICO file would exceed 4 GiB",
            ),
        };
        let data_size = u32::try_from(data.len()).map_err(|_| overflow())?;
        entries.push(IcoDirEntry::for_payload(*size, data_size, data_offset));
        data_offset = data_offset.checked_add(data_size).ok_or_else(overflow)?;
    }

    let mut output = Vec::with_capacity(data_offset as usize);
    write_parts(&mut output, &entries, payloads, layout)
        .map_err(IcoError::Io)?;
    debug_assert_eq!(output.len() as u64, data_offset as u64);
    Ok(output)
}

fn write_parts<W: Write>(
    mut writer: W,
    entries: &[IcoDirEntry],
    payloads: &[(IconSize, Vec<u8>)],
    layout: DirectoryLayout,
) -> io::Result<()> {
    writer.write_u16::<LittleEndian>(0)?; // reserved
    writer.write_u16::<LittleEndian>(ICON_TYPE)?;
    writer.write_u16::<LittleEndian>(entries.len() as u16)?;
    for entry in entries.iter() {
        entry.write(&mut writer, layout)?;
    }
    for (_, data) in payloads.iter() {
        writer.write_all(data)?;
    }
    Ok(())
}

//===========================================================================//

/// The parsed contents of an ICO file: its directory entries and the payload
/// each one points at.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct IcoDirectory {
    entries: Vec<IcoDirEntry>,
    payloads: Vec<Vec<u8>>,
}

impl IcoDirectory {
    /// Returns the directory entries, in file order.
    pub fn entries(&self) -> &[IcoDirEntry] {
        &self.entries
    }

    /// Returns the payload of the entry at `index`.
    pub fn payload(&self, index: usize) -> Option<&[u8]> {
        self.payloads.get(index).map(Vec::as_slice)
    }

    /// Returns true if the payload at `index` is PNG-encoded.
    pub fn is_png(&self, index: usize) -> bool {
        self.payload(index).map_or(false, |data| data.starts_with(PNG_SIGNATURE))
    }

    /// Reads an ICO file, interpreting directory entries per `layout`.
    pub fn read<R: Read + Seek>(
        mut reader: R,
        layout: DirectoryLayout,
    ) -> io::Result<IcoDirectory> {
        let reserved = reader.read_u16::<LittleEndian>()?;
        if reserved != 0 {
            invalid_data!(
                "Invalid reserved field value in ICONDIR \
                 (was {}, but must be 0)",
                reserved
            );
        }
        let restype = reader.read_u16::<LittleEndian>()?;
        if restype != ICON_TYPE {
            invalid_data!(
                "Invalid resource type (was {}, but must be {})",
                restype,
                ICON_TYPE
            );
        }
        let num_entries = reader.read_u16::<LittleEndian>()? as usize;
        let directory_start = reader.stream_position()?;
        let stream_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(directory_start))?;
        let mut entries = Vec::<IcoDirEntry>::with_capacity(num_entries);
        for index in 0..num_entries {
            let entry = IcoDirEntry::read(&mut reader, layout)?;
            // Check the span before allocating a buffer for it.
            let end = entry.data_offset as u64 + entry.data_size as u64;
            if end > stream_len {
                invalid_data!(
                    "Entry {} data ends at byte {}, past the end of the file                      ({} bytes)",
                    index,
                    end,
                    stream_len
                );
            }
            entries.push(entry);
        }
        let mut payloads = Vec::with_capacity(num_entries);
        for entry in entries.iter() {
            reader.seek(SeekFrom::Start(entry.data_offset as u64))?;
            let mut data = vec![0u8; entry.data_size as usize];
            reader.read_exact(&mut data)?;
            payloads.push(data);
        }
        Ok(IcoDirectory { entries, payloads })
    }
}

//===========================================================================//


//===========================================================================//
