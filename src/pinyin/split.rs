//! Splitting of latin pinyin streams ("zhongguo") into syllables.

use std::collections::HashSet;
use std::sync::LazyLock;

const SYLLABLES: &[&str] = &[
    "a", "ai", "an", "ang", "ao", "ba", "bai", "ban", "bang", "bao", "bei", "ben", "beng", "bi",
    "bian", "biao", "bie", "bin", "bing", "bo", "bu", "ca", "cai", "can", "cang", "cao", "ce",
    "cen", "ceng", "cha", "chai", "chan", "chang", "chao", "che", "chen", "cheng", "chi", "chong",
    "chou", "chu", "chua", "chuai", "chuan", "chuang", "chui", "chun", "chuo", "ci", "cong", "cou",
    "cu", "cuan", "cui", "cun", "cuo", "da", "dai", "dan", "dang", "dao", "de", "dei", "den",
    "deng", "di", "dia", "dian", "diao", "die", "ding", "diu", "dong", "dou", "du", "duan", "dui",
    "dun", "duo", "e", "ei", "en", "eng", "er", "fa", "fan", "fang", "fei", "fen", "feng", "fo",
    "fou", "fu", "ga", "gai", "gan", "gang", "gao", "ge", "gei", "gen", "geng", "gong", "gou",
    "gu", "gua", "guai", "guan", "guang", "gui", "gun", "guo", "ha", "hai", "han", "hang", "hao",
    "he", "hei", "hen", "heng", "hong", "hou", "hu", "hua", "huai", "huan", "huang", "hui", "hun",
    "huo", "ji", "jia", "jian", "jiang", "jiao", "jie", "jin", "jing", "jiong", "jiu", "ju", "juan",
    "jue", "jun", "ka", "kai", "kan", "kang", "kao", "ke", "kei", "ken", "keng", "kong", "kou",
    "ku", "kua", "kuai", "kuan", "kuang", "kui", "kun", "kuo", "la", "lai", "lan", "lang", "lao",
    "le", "lei", "leng", "li", "lia", "lian", "liang", "liao", "lie", "lin", "ling", "liu", "lo",
    "long", "lou", "lu", "luan", "lue", "lun", "luo", "lv", "lve", "ma", "mai", "man", "mang",
    "mao", "me", "mei", "men", "meng", "mi", "mian", "miao", "mie", "min", "ming", "miu", "mo",
    "mou", "mu", "na", "nai", "nan", "nang", "nao", "ne", "nei", "nen", "neng", "ni", "nian",
    "niang", "niao", "nie", "nin", "ning", "niu", "nong", "nou", "nu", "nuan", "nue", "nuo", "nv",
    "nve", "o", "ou", "pa", "pai", "pan", "pang", "pao", "pei", "pen", "peng", "pi", "pian",
    "piao", "pie", "pin", "ping", "po", "pou", "pu", "qi", "qia", "qian", "qiang", "qiao", "qie",
    "qin", "qing", "qiong", "qiu", "qu", "quan", "que", "qun", "ran", "rang", "rao", "re", "ren",
    "reng", "ri", "rong", "rou", "ru", "rua", "ruan", "rui", "run", "ruo", "sa", "sai", "san",
    "sang", "sao", "se", "sen", "seng", "sha", "shai", "shan", "shang", "shao", "she", "shei",
    "shen", "sheng", "shi", "shou", "shu", "shua", "shuai", "shuan", "shuang", "shui", "shun",
    "shuo", "si", "song", "sou", "su", "suan", "sui", "sun", "suo", "ta", "tai", "tan", "tang",
    "tao", "te", "teng", "ti", "tian", "tiao", "tie", "ting", "tong", "tou", "tu", "tuan", "tui",
    "tun", "tuo", "wa", "wai", "wan", "wang", "wei", "wen", "weng", "wo", "wu", "xi", "xia",
    "xian", "xiang", "xiao", "xie", "xin", "xing", "xiong", "xiu", "xu", "xuan", "xue", "xun",
    "ya", "yan", "yang", "yao", "ye", "yi", "yin", "ying", "yo", "yong", "you", "yu", "yuan",
    "yue", "yun", "za", "zai", "zan", "zang", "zao", "ze", "zei", "zen", "zeng", "zha", "zhai",
    "zhan", "zhang", "zhao", "zhe", "zhei", "zhen", "zheng", "zhi", "zhong", "zhou", "zhu", "zhua",
    "zhuai", "zhuan", "zhuang", "zhui", "zhun", "zhuo", "zi", "zong", "zou", "zu", "zuan", "zui",
    "zun", "zuo",
];

const MAX_SYLLABLE_LEN: usize = 6;

/// Cost of a character that starts no syllable.
const UNKNOWN_COST: usize = 10;

static SYLLABLE_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| SYLLABLES.iter().copied().collect());

/// Whether `s` is a standard pinyin syllable (without tone).
pub fn is_syllable(s: &str) -> bool {
    SYLLABLE_SET.contains(s)
}

/// Split a lowercase ASCII letter run into syllables.
///
/// The split minimizes the number of pieces; letters that cannot start any
/// syllable become single-letter pieces. Ties prefer a longer first piece,
/// so `"xian"` stays whole and `"fangan"` becomes `fang|an`.
pub fn split_syllables(run: &str) -> Vec<&str> {
    let bytes = run.as_bytes();
    let n = bytes.len();
    if n == 0 {
        return Vec::new();
    }

    // best[i] = (cost, piece length) for the suffix starting at i
    let mut best: Vec<(usize, usize)> = vec![(usize::MAX, 0); n + 1];
    best[n] = (0, 0);
    for i in (0..n).rev() {
        let max_len = MAX_SYLLABLE_LEN.min(n - i);
        for len in (1..=max_len).rev() {
            if !is_syllable(&run[i..i + len]) {
                continue;
            }
            let cost = best[i + len].0.saturating_add(1);
            if cost < best[i].0 {
                best[i] = (cost, len);
            }
        }
        let fallback = best[i + 1].0.saturating_add(UNKNOWN_COST);
        if fallback < best[i].0 {
            best[i] = (fallback, 1);
        }
    }

    let mut pieces = Vec::new();
    let mut i = 0;
    while i < n {
        let len = best[i].1;
        pieces.push(&run[i..i + len]);
        i += len;
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_basic() {
        assert_eq!(split_syllables("zhongguo"), vec!["zhong", "guo"]);
        assert_eq!(split_syllables("beijing"), vec!["bei", "jing"]);
        assert_eq!(split_syllables("xian"), vec!["xian"]);
        assert_eq!(split_syllables("fangan"), vec!["fang", "an"]);
    }

    #[test]
    fn test_split_unknown_letters() {
        assert_eq!(split_syllables("vzhang"), vec!["v", "zhang"]);
        assert!(split_syllables("").is_empty());
    }

    #[test]
    fn test_is_syllable() {
        assert!(is_syllable("zhuang"));
        assert!(!is_syllable("zhv"));
    }
}
