//! アドレスのタグ・インデックス・オフセットへの分解

/// メモリアドレス（バイト単位）
pub type Address = u32;

/// アドレス幅（ビット）
pub const ADDRESS_BITS: u32 = Address::BITS;

/// 分解済みのアドレス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodedAddress {
    /// タグ（オフセットとインデックスを除いた上位ビット）
    pub tag: u32,
    /// セットインデックス
    pub index: usize,
    /// キャッシュライン内オフセット
    pub offset: u32,
}

/// キャッシュ構成から導かれるアドレスのビット配置
///
/// ラインサイズとセット数が 2 の累乗であることは `CacheGeometry` の構築時に
/// 検証済みなので、ここでは失敗しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressLayout {
    offset_bits: u32,
    index_bits: u32,
}

impl AddressLayout {
    /// ラインサイズとセット数からビット配置を作成
    pub(crate) fn new(line_size: u32, num_sets: u32) -> Self {
        Self {
            offset_bits: line_size.trailing_zeros(),
            index_bits: num_sets.trailing_zeros(),
        }
    }

    /// オフセットのビット数
    pub fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    /// インデックスのビット数
    pub fn index_bits(&self) -> u32 {
        self.index_bits
    }

    /// タグのビット数
    pub fn tag_bits(&self) -> u32 {
        ADDRESS_BITS - self.offset_bits - self.index_bits
    }

    /// タグを取り出す際のシフト量
    pub fn tag_shift(&self) -> u32 {
        self.offset_bits + self.index_bits
    }

    /// アドレスからキャッシュライン内オフセットを計算
    pub fn offset(&self, address: Address) -> u32 {
        address & low_mask(self.offset_bits)
    }

    /// アドレスからセットインデックスを計算
    pub fn index(&self, address: Address) -> usize {
        ((address >> self.offset_bits) & low_mask(self.index_bits)) as usize
    }

    /// アドレスからタグを計算
    pub fn tag(&self, address: Address) -> u32 {
        // offset_bits + index_bits は常に 32 未満（キャッシュサイズが u32 に収まるため）
        address >> self.tag_shift()
    }

    /// アドレスを (タグ, インデックス, オフセット) に分解
    pub fn decode(&self, address: Address) -> DecodedAddress {
        DecodedAddress {
            tag: self.tag(address),
            index: self.index(address),
            offset: self.offset(address),
        }
    }
}

/// 下位 `bits` ビットが立ったマスク
fn low_mask(bits: u32) -> u32 {
    match bits {
        0 => 0,
        b if b >= ADDRESS_BITS => u32::MAX,
        b => (1u32 << b) - 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_widths() {
        // 32 バイトライン、2048 セット
        let layout = AddressLayout::new(32, 2048);
        assert_eq!(layout.offset_bits(), 5);
        assert_eq!(layout.index_bits(), 11);
        assert_eq!(layout.tag_bits(), 16);
        assert_eq!(layout.tag_shift(), 16);
    }

    #[test]
    fn test_decode_fields() {
        let layout = AddressLayout::new(32, 2048);
        let decoded = layout.decode(0b0000_0000_0000_0001_1000_0101_0001_0000);
        assert_eq!(decoded.index, 0b100_0010_1000);
        assert_eq!(decoded.offset, 0b1_0000);
        assert_eq!(decoded.tag, 0b1);
    }

    #[test]
    fn test_single_set_has_no_index_bits() {
        let layout = AddressLayout::new(4, 1);
        assert_eq!(layout.index_bits(), 0);
        for address in [0u32, 0x1234_5678, u32::MAX] {
            let decoded = layout.decode(address);
            assert_eq!(decoded.index, 0);
            assert_eq!(decoded.tag, address >> 2);
            assert_eq!(decoded.offset, address & 0b11);
        }
    }

    #[test]
    fn test_decode_is_deterministic() {
        let layout = AddressLayout::new(16, 64);
        for address in (0..100_000u32).step_by(97).chain([u32::MAX - 3, u32::MAX]) {
            let first = layout.decode(address);
            let second = layout.decode(address);
            assert_eq!(first, second);
            // 分解したフィールドを組み直すと元のアドレスに戻る
            let rebuilt = (first.tag << layout.tag_shift())
                | ((first.index as u32) << layout.offset_bits())
                | first.offset;
            assert_eq!(rebuilt, address);
        }
    }

    #[test]
    fn test_same_line_same_block() {
        let layout = AddressLayout::new(2, 4);
        // オフセットビットだけが異なるアドレスは同じブロック
        assert_eq!(layout.tag(0b1011), layout.tag(0b1010));
        assert_eq!(layout.index(0b1011), layout.index(0b1010));
        assert_ne!(layout.tag(0b1011), layout.tag(0b0011));
        assert_eq!(layout.index(0b1011), layout.index(0b0011));
    }
}
